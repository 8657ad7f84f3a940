// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging and counters for classifier performance.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;
use vendia_core::types::{ClassificationMethod, ClassificationResult, Intent};

/// Per-method counters plus a structured log line per classification.
#[derive(Default)]
pub struct ClassifierMetrics {
    llm: AtomicU64,
    fallback: AtomicU64,
    cached: AtomicU64,
    unknown: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub llm: u64,
    pub fallback: u64,
    pub cached: u64,
    pub unknown: u64,
}

impl MetricsSnapshot {
    pub fn total(&self) -> u64 {
        self.llm + self.fallback + self.cached
    }
}

impl ClassifierMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one classification outcome.
    pub fn record(&self, result: &ClassificationResult) {
        match result.method {
            ClassificationMethod::Llm => self.llm.fetch_add(1, Ordering::Relaxed),
            ClassificationMethod::Fallback => self.fallback.fetch_add(1, Ordering::Relaxed),
            ClassificationMethod::Cached => self.cached.fetch_add(1, Ordering::Relaxed),
        };
        if result.intent == Intent::Unknown {
            self.unknown.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ms
            .fetch_add(result.processing_time_ms, Ordering::Relaxed);

        info!(
            intent = %result.intent,
            confidence = result.confidence,
            method = %result.method,
            latency_ms = result.processing_time_ms,
            has_date = result.entities.target_date.is_some(),
            has_time = result.entities.target_time.is_some(),
            "message classified"
        );
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            llm: self.llm.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            cached: self.cached.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
        }
    }

    /// Mean classification latency in milliseconds, 0 when nothing recorded.
    pub fn mean_latency_ms(&self) -> u64 {
        let total = self.snapshot().total();
        if total == 0 {
            0
        } else {
            self.total_latency_ms.load(Ordering::Relaxed) / total
        }
    }
}

#[cfg(test)]
mod tests {
    use vendia_core::types::Entities;

    use super::*;

    fn result(method: ClassificationMethod, intent: Intent, latency: u64) -> ClassificationResult {
        ClassificationResult {
            intent,
            confidence: 0.5,
            entities: Entities::default(),
            method,
            reasoning: String::new(),
            processing_time_ms: latency,
        }
    }

    #[test]
    fn counters_track_methods_and_unknown() {
        let metrics = ClassifierMetrics::new();
        metrics.record(&result(ClassificationMethod::Llm, Intent::Greeting, 10));
        metrics.record(&result(ClassificationMethod::Fallback, Intent::Unknown, 2));
        metrics.record(&result(ClassificationMethod::Cached, Intent::Greeting, 0));

        let snap = metrics.snapshot();
        assert_eq!(snap.llm, 1);
        assert_eq!(snap.fallback, 1);
        assert_eq!(snap.cached, 1);
        assert_eq!(snap.unknown, 1);
        assert_eq!(snap.total(), 3);
        assert_eq!(metrics.mean_latency_ms(), 4);
    }

    #[test]
    fn empty_metrics_have_zero_mean() {
        assert_eq!(ClassifierMetrics::new().mean_latency_ms(), 0);
    }
}
