// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation-tier selection as an ordered rule table.
//!
//! `select_model` is a pure function: first rule whose predicate matches
//! wins, and cost optimization is the fallback rule at the bottom, not the
//! default-first check. Reason strings are part of the observable contract
//! (surfaced in logs and metrics) and must remain stable.

use vendia_core::types::{ConversationContext, Intent, SalesPhase};

/// Which quality/cost tier should generate the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationTier {
    Cheap,
    Expensive,
}

/// A concrete provider/model pair configured for one tier.
#[derive(Debug, Clone)]
pub struct TierModel {
    pub provider: String,
    pub model: String,
}

/// Outcome of tier selection for one turn.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub tier: GenerationTier,
    pub model: String,
    pub provider: String,
    /// Stable identifier of the rule that fired.
    pub reason: &'static str,
    pub metadata: RoutingMetadata,
}

/// Context snapshot carried alongside the decision for debugging.
#[derive(Debug, Clone, Default)]
pub struct RoutingMetadata {
    pub sales_phase: Option<SalesPhase>,
    pub customer_value: Option<f64>,
    pub approx_tokens: u32,
    pub history_len: usize,
}

/// Tunable thresholds for the rule table.
#[derive(Debug, Clone)]
pub struct RoutingThresholds {
    /// Running token count above which a conversation routes expensive.
    pub token_threshold: u32,
    /// Customer value above which the customer routes expensive.
    pub vip_customer_value: f64,
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            token_threshold: 800,
            vip_customer_value: 10_000.0,
        }
    }
}

/// One row of the rule table.
struct TierRule {
    reason: &'static str,
    tier: GenerationTier,
    predicate: fn(Intent, &ConversationContext, &RoutingThresholds) -> bool,
}

/// Ordered, first-match-wins. The final row always matches.
const RULES: &[TierRule] = &[
    TierRule {
        reason: "always_simple",
        tier: GenerationTier::Cheap,
        predicate: |intent, _, _| {
            matches!(
                intent,
                Intent::Greeting | Intent::Confirmation | Intent::Negation | Intent::Unknown
            )
        },
    },
    TierRule {
        reason: "always_complex",
        tier: GenerationTier::Expensive,
        predicate: |intent, _, _| {
            matches!(
                intent,
                Intent::HumanHandoff
                    | Intent::AppointmentCancel
                    | Intent::Objection
                    | Intent::Negotiation
            )
        },
    },
    TierRule {
        reason: "critical_sales_phase",
        tier: GenerationTier::Expensive,
        predicate: |_, context, _| {
            matches!(
                context.sales_phase,
                Some(SalesPhase::Implication | SalesPhase::NeedPayoff | SalesPhase::Closing)
            )
        },
    },
    TierRule {
        reason: "vip_customer",
        tier: GenerationTier::Expensive,
        predicate: |_, context, thresholds| {
            context
                .customer_value
                .is_some_and(|v| v > thresholds.vip_customer_value)
        },
    },
    TierRule {
        reason: "complex_history",
        tier: GenerationTier::Expensive,
        predicate: |_, context, _| {
            context.recent_intents.iter().any(|i| {
                matches!(
                    i,
                    Intent::Objection | Intent::Negotiation | Intent::ProductComparison
                )
            })
        },
    },
    TierRule {
        reason: "high_token_complexity",
        tier: GenerationTier::Expensive,
        predicate: |_, context, thresholds| context.approx_tokens > thresholds.token_threshold,
    },
    TierRule {
        reason: "default_optimization",
        tier: GenerationTier::Cheap,
        predicate: |_, _, _| true,
    },
];

/// Pure tier selector over the configured cheap/expensive models.
pub struct IntelligentRouter {
    cheap: TierModel,
    expensive: TierModel,
    thresholds: RoutingThresholds,
}

impl IntelligentRouter {
    pub fn new(cheap: TierModel, expensive: TierModel, thresholds: RoutingThresholds) -> Self {
        Self {
            cheap,
            expensive,
            thresholds,
        }
    }

    /// Evaluates the rule table top to bottom and returns the first match.
    pub fn select_model(&self, intent: Intent, context: &ConversationContext) -> RoutingDecision {
        // The table ends in an always-true row, so find() cannot miss.
        let rule = RULES
            .iter()
            .find(|rule| (rule.predicate)(intent, context, &self.thresholds))
            .unwrap_or(&RULES[RULES.len() - 1]);

        let choice = match rule.tier {
            GenerationTier::Cheap => &self.cheap,
            GenerationTier::Expensive => &self.expensive,
        };

        RoutingDecision {
            tier: rule.tier,
            model: choice.model.clone(),
            provider: choice.provider.clone(),
            reason: rule.reason,
            metadata: RoutingMetadata {
                sales_phase: context.sales_phase,
                customer_value: context.customer_value,
                approx_tokens: context.approx_tokens,
                history_len: context.history_len,
            },
        }
    }
}
