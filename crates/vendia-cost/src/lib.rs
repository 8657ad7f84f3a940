// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage accounting: pricing tables, the SQLite usage ledger, and the
//! best-effort cost tracker.

pub mod ledger;
pub mod pricing;
pub mod tracker;

pub use ledger::{DayTotals, UsageLedger};
pub use pricing::{estimate_cost, get_pricing, ModelPricing};
pub use tracker::{CostTracker, UsageEvent};
