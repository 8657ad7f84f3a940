// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage persistence trait for per-tenant generation accounting.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::VendiaError;
use crate::types::ProviderLevel;

/// Aggregation key for a usage record: one row per (organization, day,
/// provider, model, level).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageKey {
    pub organization_id: String,
    pub day: NaiveDate,
    pub provider: String,
    pub model: String,
    pub level: ProviderLevel,
}

/// Additive increment applied to a usage record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageDelta {
    /// Number of requests in this increment (normally 1).
    pub requests: u32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_usd: f64,
    pub response_time_ms: u64,
    /// Whether the attempt succeeded; failures still count toward totals.
    pub success: bool,
}

/// Persistence collaborator for usage records.
///
/// Implementations must be idempotent per key/day in the upsert sense:
/// repeated increments accumulate, they never create duplicate rows.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Applies `delta` to the record identified by `key`, creating it if absent.
    async fn upsert_usage(&self, key: &UsageKey, delta: &UsageDelta) -> Result<(), VendiaError>;

    /// Total cost in USD accumulated by an organization on `day`.
    async fn organization_day_cost(
        &self,
        organization_id: &str,
        day: NaiveDate,
    ) -> Result<f64, VendiaError>;
}
