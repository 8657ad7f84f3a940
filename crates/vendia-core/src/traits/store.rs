// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral shared key-value store trait.
//!
//! The only cross-process shared mutable state in the system. Used
//! exclusively by the booking safety layer to hold pending bookings.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::VendiaError;

/// Shared key-value store with per-key expiry (Redis-shaped).
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, VendiaError>;

    /// Sets `key` to `value` with the given time-to-live, overwriting any
    /// existing value and its expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), VendiaError>;

    /// Deletes `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), VendiaError>;
}
