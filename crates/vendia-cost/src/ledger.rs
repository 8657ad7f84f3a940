// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed usage ledger.
//!
//! One row per (organization, day, provider, model, level). Every generation
//! attempt, successful or failed, is folded into its row additively; the
//! response-time average is derived from the stored total at query time.

use chrono::NaiveDate;
use vendia_core::traits::{UsageDelta, UsageKey, UsageStore};
use vendia_core::VendiaError;

/// Aggregated view of one organization's usage for a single day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayTotals {
    pub requests: u32,
    pub successes: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub avg_response_time_ms: u64,
}

/// Convert a tokio-rusqlite error into VendiaError::Store.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VendiaError {
    VendiaError::Store {
        source: Box::new(e),
    }
}

/// Persistent usage ledger backed by SQLite.
///
/// All operations go through the single tokio-rusqlite background thread.
pub struct UsageLedger {
    conn: tokio_rusqlite::Connection,
}

impl UsageLedger {
    /// Create a usage ledger on an existing connection and ensure its schema.
    pub async fn new(conn: tokio_rusqlite::Connection) -> Result<Self, VendiaError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS usage_ledger (
                    organization_id TEXT NOT NULL,
                    day TEXT NOT NULL,
                    provider TEXT NOT NULL,
                    model TEXT NOT NULL,
                    level TEXT NOT NULL,
                    requests INTEGER NOT NULL DEFAULT 0,
                    successes INTEGER NOT NULL DEFAULT 0,
                    input_tokens INTEGER NOT NULL DEFAULT 0,
                    output_tokens INTEGER NOT NULL DEFAULT 0,
                    cost_usd REAL NOT NULL DEFAULT 0.0,
                    total_response_time_ms INTEGER NOT NULL DEFAULT 0,
                    PRIMARY KEY (organization_id, day, provider, model, level)
                );
                CREATE INDEX IF NOT EXISTS idx_usage_ledger_org_day
                    ON usage_ledger(organization_id, day);",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        Ok(Self { conn })
    }

    /// Open a usage ledger from a database file path.
    pub async fn open(path: &str) -> Result<Self, VendiaError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| VendiaError::Store {
                source: Box::new(e),
            })?;
        Self::new(conn).await
    }

    /// Aggregated totals for one organization on one day, across providers,
    /// models, and levels.
    pub async fn organization_day_totals(
        &self,
        organization_id: &str,
        day: NaiveDate,
    ) -> Result<DayTotals, VendiaError> {
        let organization_id = organization_id.to_string();
        let day = day.to_string();
        self.conn
            .call(move |conn| {
                let (requests, successes, input_tokens, output_tokens, cost_usd, total_rt): (
                    u32,
                    u32,
                    u64,
                    u64,
                    f64,
                    u64,
                ) = conn.query_row(
                    "SELECT COALESCE(SUM(requests), 0), COALESCE(SUM(successes), 0), \
                     COALESCE(SUM(input_tokens), 0), COALESCE(SUM(output_tokens), 0), \
                     COALESCE(SUM(cost_usd), 0.0), COALESCE(SUM(total_response_time_ms), 0) \
                     FROM usage_ledger WHERE organization_id = ?1 AND day = ?2",
                    rusqlite::params![organization_id, day],
                    |row| {
                        Ok((
                            row.get(0)?,
                            row.get(1)?,
                            row.get(2)?,
                            row.get(3)?,
                            row.get(4)?,
                            row.get(5)?,
                        ))
                    },
                )?;
                Ok(DayTotals {
                    requests,
                    successes,
                    input_tokens,
                    output_tokens,
                    cost_usd,
                    avg_response_time_ms: if requests == 0 {
                        0
                    } else {
                        total_rt / u64::from(requests)
                    },
                })
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait::async_trait]
impl UsageStore for UsageLedger {
    async fn upsert_usage(&self, key: &UsageKey, delta: &UsageDelta) -> Result<(), VendiaError> {
        let organization_id = key.organization_id.clone();
        let day = key.day.to_string();
        let provider = key.provider.clone();
        let model = key.model.clone();
        let level = key.level.to_string();
        let requests = delta.requests;
        let successes = if delta.success { delta.requests } else { 0 };
        let input_tokens = delta.input_tokens;
        let output_tokens = delta.output_tokens;
        let cost_usd = delta.cost_usd;
        let response_time_ms = delta.response_time_ms;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO usage_ledger (organization_id, day, provider, model, level, \
                     requests, successes, input_tokens, output_tokens, cost_usd, \
                     total_response_time_ms) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
                     ON CONFLICT(organization_id, day, provider, model, level) DO UPDATE SET \
                     requests = requests + excluded.requests, \
                     successes = successes + excluded.successes, \
                     input_tokens = input_tokens + excluded.input_tokens, \
                     output_tokens = output_tokens + excluded.output_tokens, \
                     cost_usd = cost_usd + excluded.cost_usd, \
                     total_response_time_ms = \
                         total_response_time_ms + excluded.total_response_time_ms",
                    rusqlite::params![
                        organization_id,
                        day,
                        provider,
                        model,
                        level,
                        requests,
                        successes,
                        input_tokens,
                        output_tokens,
                        cost_usd,
                        response_time_ms,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn organization_day_cost(
        &self,
        organization_id: &str,
        day: NaiveDate,
    ) -> Result<f64, VendiaError> {
        let organization_id = organization_id.to_string();
        let day = day.to_string();
        self.conn
            .call(move |conn| {
                let total: f64 = conn.query_row(
                    "SELECT COALESCE(SUM(cost_usd), 0.0) FROM usage_ledger \
                     WHERE organization_id = ?1 AND day = ?2",
                    rusqlite::params![organization_id, day],
                    |row| row.get(0),
                )?;
                Ok(total)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use vendia_core::types::ProviderLevel;

    use super::*;

    async fn test_ledger() -> UsageLedger {
        let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
        UsageLedger::new(conn).await.unwrap()
    }

    fn key(org: &str, level: ProviderLevel) -> UsageKey {
        UsageKey {
            organization_id: org.to_string(),
            day: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            level,
        }
    }

    fn delta(cost_usd: f64, success: bool, response_time_ms: u64) -> UsageDelta {
        UsageDelta {
            requests: 1,
            input_tokens: 100,
            output_tokens: 50,
            cost_usd,
            response_time_ms,
            success,
        }
    }

    #[tokio::test]
    async fn upsert_accumulates_into_one_row() {
        let ledger = test_ledger().await;
        let k = key("org-1", ProviderLevel::L1);

        ledger.upsert_usage(&k, &delta(0.01, true, 100)).await.unwrap();
        ledger.upsert_usage(&k, &delta(0.02, true, 300)).await.unwrap();

        let totals = ledger
            .organization_day_totals("org-1", k.day)
            .await
            .unwrap();
        assert_eq!(totals.requests, 2);
        assert_eq!(totals.successes, 2);
        assert_eq!(totals.input_tokens, 200);
        assert_eq!(totals.output_tokens, 100);
        assert!((totals.cost_usd - 0.03).abs() < 1e-10);
        assert_eq!(totals.avg_response_time_ms, 200);
    }

    #[tokio::test]
    async fn failed_attempts_count_requests_not_successes() {
        let ledger = test_ledger().await;
        let k = key("org-1", ProviderLevel::L2);

        ledger.upsert_usage(&k, &delta(0.0, false, 50)).await.unwrap();
        ledger.upsert_usage(&k, &delta(0.01, true, 150)).await.unwrap();

        let totals = ledger
            .organization_day_totals("org-1", k.day)
            .await
            .unwrap();
        assert_eq!(totals.requests, 2);
        assert_eq!(totals.successes, 1);
    }

    #[tokio::test]
    async fn distinct_levels_get_distinct_rows_but_shared_totals() {
        let ledger = test_ledger().await;
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        ledger
            .upsert_usage(&key("org-1", ProviderLevel::L1), &delta(0.01, true, 100))
            .await
            .unwrap();
        ledger
            .upsert_usage(&key("org-1", ProviderLevel::L3), &delta(0.10, true, 400))
            .await
            .unwrap();

        let totals = ledger.organization_day_totals("org-1", day).await.unwrap();
        assert_eq!(totals.requests, 2);
        assert!((totals.cost_usd - 0.11).abs() < 1e-10);
    }

    #[tokio::test]
    async fn day_cost_filters_by_organization() {
        let ledger = test_ledger().await;
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        ledger
            .upsert_usage(&key("org-a", ProviderLevel::L1), &delta(1.0, true, 10))
            .await
            .unwrap();
        ledger
            .upsert_usage(&key("org-b", ProviderLevel::L1), &delta(2.0, true, 10))
            .await
            .unwrap();

        assert!((ledger.organization_day_cost("org-a", day).await.unwrap() - 1.0).abs() < 1e-10);
        assert!((ledger.organization_day_cost("org-b", day).await.unwrap() - 2.0).abs() < 1e-10);
    }

    #[tokio::test]
    async fn empty_ledger_reports_zero() {
        let ledger = test_ledger().await;
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let totals = ledger.organization_day_totals("org-x", day).await.unwrap();
        assert_eq!(totals, DayTotals::default());
    }

    #[tokio::test]
    async fn file_backed_ledger_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");
        let path = path.to_str().unwrap();
        let k = key("org-1", ProviderLevel::L1);

        {
            let ledger = UsageLedger::open(path).await.unwrap();
            ledger.upsert_usage(&k, &delta(0.05, true, 100)).await.unwrap();
        }

        let reopened = UsageLedger::open(path).await.unwrap();
        let totals = reopened
            .organization_day_totals("org-1", k.day)
            .await
            .unwrap();
        assert_eq!(totals.requests, 1);
        assert!((totals.cost_usd - 0.05).abs() < 1e-10);
    }
}
