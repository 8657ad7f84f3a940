// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification pipeline: TTL cache, LLM provider with strict JSON
//! output, regex fallback, and entity enrichment.

pub mod cache;
pub mod classifier;
pub mod metrics;

pub use cache::ClassificationCache;
pub use classifier::IntentClassifier;
pub use metrics::{ClassifierMetrics, MetricsSnapshot};
