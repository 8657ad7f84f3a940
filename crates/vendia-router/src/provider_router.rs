// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered provider management with failover chaining.
//!
//! Three optional provider slots (L1 fast, L2 contextual, L3 complex
//! reasoning). The level is either forced by the caller or derived from a
//! complexity heuristic, then providers are tried in a fixed per-level
//! order. Every attempt with organization context records a usage event,
//! success or failure.

use std::sync::Arc;
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use tracing::{info, warn};
use vendia_core::traits::GenerationProvider;
use vendia_core::types::{
    ChatMessage, ChatRequest, ChatResponse, ChatRole, ConversationContext, ProviderLevel,
};
use vendia_core::VendiaError;
use vendia_cost::{CostTracker, UsageEvent};

/// Messages that look like price pushback, complaints, or legal exposure go
/// straight to the reasoning tier.
static ESCALATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(descuento|rebaja|muy caro|carisimo|demasiado|competencia|queja|reclamo|reembolso|devolucion|abogado|legal|contrato|demanda|garantia)\b",
    )
    .unwrap()
});

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(hola|buenos dias|buenas tardes|buenas noches|buenas|hey|gracias|ok)\b")
        .unwrap()
});

/// History length beyond which a conversation needs the contextual tier.
const LONG_HISTORY: usize = 10;

/// Per-call options for routed generation.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Forced provider level; `None` lets the complexity heuristic decide.
    pub level: Option<ProviderLevel>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Tenant for usage accounting; attempts without it are not recorded.
    pub organization_id: Option<String>,
}

/// A successful generation with the level and provider that produced it.
#[derive(Debug, Clone)]
pub struct RoutedResponse {
    pub response: ChatResponse,
    pub level: ProviderLevel,
    pub provider: String,
}

/// Failover order per entry level. First success wins.
fn failover_order(level: ProviderLevel) -> [ProviderLevel; 3] {
    match level {
        ProviderLevel::L1 => [ProviderLevel::L1, ProviderLevel::L2, ProviderLevel::L3],
        ProviderLevel::L2 => [ProviderLevel::L2, ProviderLevel::L1, ProviderLevel::L3],
        ProviderLevel::L3 => [ProviderLevel::L3, ProviderLevel::L2, ProviderLevel::L1],
    }
}

fn slot_index(level: ProviderLevel) -> usize {
    match level {
        ProviderLevel::L1 => 0,
        ProviderLevel::L2 => 1,
        ProviderLevel::L3 => 2,
    }
}

/// Routes chat requests across up to three provider tiers.
pub struct ModelRouter {
    slots: [Option<Arc<dyn GenerationProvider>>; 3],
    tracker: Option<Arc<CostTracker>>,
}

impl std::fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRouter")
            .field(
                "slots",
                &self.slots.iter().map(Option::is_some).collect::<Vec<_>>(),
            )
            .field("tracker", &self.tracker.is_some())
            .finish()
    }
}

impl ModelRouter {
    /// Builds a router from the configured slots.
    ///
    /// Zero configured providers is a startup error, raised eagerly rather
    /// than on the first request.
    pub fn new(
        l1: Option<Arc<dyn GenerationProvider>>,
        l2: Option<Arc<dyn GenerationProvider>>,
        l3: Option<Arc<dyn GenerationProvider>>,
        tracker: Option<Arc<CostTracker>>,
    ) -> Result<Self, VendiaError> {
        let slots = [l1, l2, l3];
        if slots.iter().all(Option::is_none) {
            return Err(VendiaError::Config(
                "no generation providers configured; at least one of l1/l2/l3 is required"
                    .to_string(),
            ));
        }
        Ok(Self { slots, tracker })
    }

    /// Heuristic level selection, used only when the caller does not force
    /// a level.
    pub fn classify_complexity(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> ProviderLevel {
        let normalized = normalize(message);

        if ESCALATION.is_match(&normalized) {
            return ProviderLevel::L3;
        }
        if normalized.len() < 20
            || GREETING.is_match(&normalized)
            || normalized.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
        {
            return ProviderLevel::L1;
        }
        if context.history_len > LONG_HISTORY || context.product_search {
            return ProviderLevel::L2;
        }
        ProviderLevel::L1
    }

    /// Sends `messages` to the resolved level, failing over through the
    /// remaining configured tiers. Returns the first success, or re-raises
    /// the last error when every configured provider fails.
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        context: &ConversationContext,
    ) -> Result<RoutedResponse, VendiaError> {
        let level = options.level.unwrap_or_else(|| {
            let last_user = messages
                .iter()
                .rev()
                .find(|m| m.role == ChatRole::User)
                .map(|m| m.content.as_str())
                .unwrap_or("");
            self.classify_complexity(last_user, context)
        });

        let mut last_error = None;

        for candidate in failover_order(level) {
            let Some(provider) = &self.slots[slot_index(candidate)] else {
                continue;
            };

            let request = ChatRequest {
                model: String::new(),
                messages: messages.clone(),
                max_tokens: options.max_tokens,
                temperature: options.temperature,
            };

            let started = Instant::now();
            let attempt = provider.chat(request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match attempt {
                Ok(response) => {
                    self.record_attempt(&options, provider.as_ref(), candidate, &Some(&response), elapsed_ms)
                        .await;
                    if candidate != level {
                        info!(
                            requested = %level,
                            served = %candidate,
                            provider = provider.name(),
                            "request served by failover tier"
                        );
                    }
                    return Ok(RoutedResponse {
                        response,
                        level: candidate,
                        provider: provider.name().to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        level = %candidate,
                        provider = provider.name(),
                        error = %e,
                        "provider attempt failed"
                    );
                    self.record_attempt(&options, provider.as_ref(), candidate, &None, elapsed_ms)
                        .await;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            VendiaError::Internal("no provider slot configured for any level".to_string())
        }))
    }

    async fn record_attempt(
        &self,
        options: &ChatOptions,
        provider: &dyn GenerationProvider,
        level: ProviderLevel,
        response: &Option<&ChatResponse>,
        elapsed_ms: u64,
    ) {
        let (Some(tracker), Some(organization_id)) = (&self.tracker, &options.organization_id)
        else {
            return;
        };

        let event = UsageEvent {
            organization_id: organization_id.clone(),
            provider: provider.name().to_string(),
            model: response
                .map(|r| r.model.clone())
                .unwrap_or_else(|| provider.model().to_string()),
            level,
            input_tokens: response.map(|r| r.input_tokens).unwrap_or(0),
            output_tokens: response.map(|r| r.output_tokens).unwrap_or(0),
            response_time_ms: elapsed_ms,
            success: response.is_some(),
        };
        tracker.track(&event).await;
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}
