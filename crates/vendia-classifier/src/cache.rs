// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL-bounded classification cache keyed by normalized message text.
//!
//! Known limitation: the key is the lowercased, trimmed message text only --
//! context fields (including the reference date used for relative-date
//! entities) are not part of the key, so an entry like "mañana" cached just
//! before midnight can carry a stale date after the boundary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;
use vendia_core::types::{ClassificationMethod, ClassificationResult};

/// Default entry time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default interval for the background sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct CacheEntry {
    result: ClassificationResult,
    stored_at: Instant,
}

/// Process-local TTL map of classification results with hit/miss counters.
pub struct ClassificationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ClassificationCache {
    /// Creates a cache with the default 300s TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Looks up a fresh entry for `message`.
    ///
    /// A fresh hit returns a copy tagged with method `cached`. A stale entry
    /// is evicted lazily and counted as a miss.
    pub fn get(&self, message: &str) -> Option<ClassificationResult> {
        let key = normalize_key(message);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let mut copy = entry.result.clone();
                copy.method = ClassificationMethod::Cached;
                Some(copy)
            }
            Some(_) => {
                entries.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a result under the normalized message key, overwriting any
    /// existing entry and restarting its TTL.
    pub fn set(&self, message: &str, result: &ClassificationResult) {
        let key = normalize_key(message);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            CacheEntry {
                result: result.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Removes every stale entry, independent of reads. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "classification cache sweep");
        }
        removed
    }

    /// Spawns the periodic sweep task.
    pub fn spawn_sweeper(
        self: &std::sync::Arc<Self>,
        interval: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let cache = std::sync::Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.sweep();
            }
        })
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClassificationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Key normalization: lowercased, trimmed message text.
fn normalize_key(message: &str) -> String {
    message.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use vendia_core::types::{Entities, Intent};

    use super::*;

    fn sample(intent: Intent) -> ClassificationResult {
        ClassificationResult {
            intent,
            confidence: 0.9,
            entities: Entities::default(),
            method: ClassificationMethod::Llm,
            reasoning: "test".into(),
            processing_time_ms: 1,
        }
    }

    #[test]
    fn fresh_hit_is_tagged_cached() {
        let cache = ClassificationCache::new();
        cache.set("Hola", &sample(Intent::Greeting));

        let hit = cache.get("  hola  ").expect("normalized key should hit");
        assert_eq!(hit.intent, Intent::Greeting);
        assert_eq!(hit.method, ClassificationMethod::Cached);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn miss_counts_and_returns_none() {
        let cache = ClassificationCache::new();
        assert!(cache.get("nunca visto").is_none());
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn stale_entry_evicted_on_read() {
        let cache = ClassificationCache::with_ttl(Duration::ZERO);
        cache.set("hola", &sample(Intent::Greeting));
        assert!(cache.get("hola").is_none());
        assert_eq!(cache.misses(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_same_key() {
        let cache = ClassificationCache::new();
        cache.set("hola", &sample(Intent::Greeting));
        cache.set("hola", &sample(Intent::Confirmation));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("hola").unwrap().intent, Intent::Confirmation);
    }

    #[test]
    fn sweep_removes_only_stale_entries() {
        let cache = ClassificationCache::with_ttl(Duration::ZERO);
        cache.set("uno", &sample(Intent::Greeting));
        cache.set("dos", &sample(Intent::Negation));
        assert_eq!(cache.sweep(), 2);
        assert!(cache.is_empty());

        let fresh = ClassificationCache::new();
        fresh.set("uno", &sample(Intent::Greeting));
        assert_eq!(fresh.sweep(), 0);
        assert_eq!(fresh.len(), 1);
    }

    #[tokio::test]
    async fn sweeper_task_runs() {
        let cache = std::sync::Arc::new(ClassificationCache::with_ttl(Duration::ZERO));
        cache.set("uno", &sample(Intent::Greeting));
        let handle = cache.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.is_empty());
        handle.abort();
    }
}
