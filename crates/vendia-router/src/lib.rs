// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing: pure generation-tier selection and tiered provider management
//! with failover.

pub mod provider_router;
pub mod rules;

pub use provider_router::{ChatOptions, ModelRouter, RoutedResponse};
pub use rules::{
    GenerationTier, IntelligentRouter, RoutingDecision, RoutingMetadata, RoutingThresholds,
    TierModel,
};
