// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process ephemeral store.
//!
//! Single-instance stand-in for a shared store: keys expire lazily on read.
//! Multi-instance deployments need a real shared backend behind the same
//! trait, since the pending-booking record must be visible across replicas.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use vendia_core::traits::EphemeralStore;
use vendia_core::VendiaError;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// `EphemeralStore` backed by a process-local map with per-key expiry.
#[derive(Default)]
pub struct MemoryEphemeralStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryEphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for MemoryEphemeralStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VendiaError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), VendiaError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), VendiaError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let store = MemoryEphemeralStore::new();
        store
            .set_ex("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());

        // Deleting an absent key is not an error.
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn expired_key_reads_as_absent() {
        let store = MemoryEphemeralStore::new();
        store.set_ex("k", "v", Duration::ZERO).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overwrite_replaces_value_and_ttl() {
        let store = MemoryEphemeralStore::new();
        store.set_ex("k", "old", Duration::ZERO).await.unwrap();
        store
            .set_ex("k", "new", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
