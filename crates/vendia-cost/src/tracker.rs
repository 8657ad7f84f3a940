// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort usage tracking around generation attempts.
//!
//! Tracking is strictly off the critical path: a ledger failure is logged
//! and swallowed, it never fails the request that triggered it. The tracker
//! emits a `tracing::warn` when an organization crosses 80% of its daily
//! budget; the budget is advisory, requests are never blocked.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use vendia_core::traits::{UsageDelta, UsageKey, UsageStore};
use vendia_core::types::ProviderLevel;

use crate::pricing;

/// One generation attempt, successful or failed.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub organization_id: String,
    pub provider: String,
    pub model: String,
    pub level: ProviderLevel,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub response_time_ms: u64,
    pub success: bool,
}

/// Records usage events against the ledger and watches the daily budget.
pub struct CostTracker {
    store: Arc<dyn UsageStore>,
    daily_budget_usd: Option<f64>,
}

impl CostTracker {
    pub fn new(store: Arc<dyn UsageStore>, daily_budget_usd: Option<f64>) -> Self {
        Self {
            store,
            daily_budget_usd,
        }
    }

    /// Folds one attempt into the ledger. Never fails.
    pub async fn track(&self, event: &UsageEvent) {
        let cost_usd = pricing::estimate_cost(&event.model, event.input_tokens, event.output_tokens);
        let day = Utc::now().date_naive();

        let key = UsageKey {
            organization_id: event.organization_id.clone(),
            day,
            provider: event.provider.clone(),
            model: event.model.clone(),
            level: event.level,
        };
        let delta = UsageDelta {
            requests: 1,
            input_tokens: event.input_tokens,
            output_tokens: event.output_tokens,
            cost_usd,
            response_time_ms: event.response_time_ms,
            success: event.success,
        };

        if let Err(e) = self.store.upsert_usage(&key, &delta).await {
            warn!(
                organization_id = %event.organization_id,
                error = %e,
                "failed to record usage, continuing"
            );
            return;
        }

        debug!(
            organization_id = %event.organization_id,
            provider = %event.provider,
            model = %event.model,
            level = %event.level,
            cost_usd,
            success = event.success,
            "usage recorded"
        );

        self.check_watermark(&event.organization_id, day).await;
    }

    /// Warns when today's spend crosses 80% of the daily budget.
    async fn check_watermark(&self, organization_id: &str, day: chrono::NaiveDate) {
        let Some(budget) = self.daily_budget_usd else {
            return;
        };
        match self.store.organization_day_cost(organization_id, day).await {
            Ok(total) if total >= budget * 0.8 => {
                warn!(
                    organization_id = %organization_id,
                    daily_total = total,
                    daily_budget = budget,
                    "approaching daily budget (80%+)"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(organization_id = %organization_id, error = %e, "budget check failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ledger::UsageLedger;

    use super::*;

    async fn tracker_with_budget(budget: Option<f64>) -> (CostTracker, Arc<UsageLedger>) {
        let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
        let ledger = Arc::new(UsageLedger::new(conn).await.unwrap());
        (CostTracker::new(ledger.clone(), budget), ledger)
    }

    fn event(success: bool) -> UsageEvent {
        UsageEvent {
            organization_id: "org-1".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            level: ProviderLevel::L1,
            input_tokens: 1000,
            output_tokens: 500,
            response_time_ms: 120,
            success,
        }
    }

    #[tokio::test]
    async fn track_records_cost_for_success_and_failure() {
        let (tracker, ledger) = tracker_with_budget(None).await;
        tracker.track(&event(true)).await;
        tracker.track(&event(false)).await;

        let day = Utc::now().date_naive();
        let totals = ledger.organization_day_totals("org-1", day).await.unwrap();
        assert_eq!(totals.requests, 2);
        assert_eq!(totals.successes, 1);
        assert!(totals.cost_usd > 0.0);
    }

    #[tokio::test]
    async fn watermark_does_not_block_requests() {
        // Budget tiny enough that one event crosses 80%; tracking still works.
        let (tracker, ledger) = tracker_with_budget(Some(0.0001)).await;
        tracker.track(&event(true)).await;
        tracker.track(&event(true)).await;

        let day = Utc::now().date_naive();
        let totals = ledger.organization_day_totals("org-1", day).await.unwrap();
        assert_eq!(totals.requests, 2);
    }
}
