// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across the Vendia workspace.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Customer intents recognized by the classification layer.
///
/// The LLM classifier is instructed to emit exactly one of these values;
/// anything it invents outside the set is mapped to [`Intent::Unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Confirmation,
    Negation,
    AppointmentNew,
    AppointmentReschedule,
    AppointmentCancel,
    QuoteRequest,
    ProductInfo,
    ProductComparison,
    Objection,
    Negotiation,
    HumanHandoff,
    Unknown,
}

impl Intent {
    /// All values the LLM classifier is allowed to emit (everything but `unknown`).
    pub fn allowed() -> &'static [Intent] {
        &[
            Intent::Greeting,
            Intent::Confirmation,
            Intent::Negation,
            Intent::AppointmentNew,
            Intent::AppointmentReschedule,
            Intent::AppointmentCancel,
            Intent::QuoteRequest,
            Intent::ProductInfo,
            Intent::ProductComparison,
            Intent::Objection,
            Intent::Negotiation,
            Intent::HumanHandoff,
        ]
    }
}

/// Role of a chat message, constructed explicitly by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat turn sent to a generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A request to a generation provider.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier; empty string means the provider's default model.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// A response from a generation provider.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Generation provider cost/capability class.
///
/// Distinct from the cheap/expensive tier selection of the rule router:
/// levels identify concrete provider slots, tiers express per-turn intent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderLevel {
    /// Fast, cheap model for short factual or social exchanges.
    L1,
    /// Contextual model for product search and longer conversations.
    L2,
    /// Complex-reasoning model for negotiation, complaints, and legal wording.
    L3,
}

/// Coarse conversational phase of a sales conversation.
///
/// Advanced by phase tags embedded in generated text. The ordering is
/// advisory only; no hard ordering is enforced on transitions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesPhase {
    Onboarding,
    Situation,
    Problem,
    Implication,
    NeedPayoff,
    Closing,
    Completed,
}

/// Structured entities extracted from a customer message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub target_date: Option<NaiveDate>,
    pub target_time: Option<NaiveTime>,
    pub product_name: Option<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.target_date.is_none() && self.target_time.is_none() && self.product_name.is_none()
    }
}

/// How a classification result was produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMethod {
    Llm,
    Fallback,
    Cached,
}

/// Result of classifying one inbound customer message.
///
/// Invariant: `confidence` is always in `[0.0, 1.0]`, and `Unknown` is only
/// produced when no signal was found at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Entities,
    pub method: ClassificationMethod,
    pub reasoning: String,
    pub processing_time_ms: u64,
}

/// Per-conversation context threaded through classification and routing.
///
/// Owned by the invoking turn; the decision layer never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    /// Current sales phase of the conversation, if tracked.
    pub sales_phase: Option<SalesPhase>,
    /// Estimated customer value in the tenant's currency.
    pub customer_value: Option<f64>,
    /// Intents observed on recent turns, newest last.
    pub recent_intents: Vec<Intent>,
    /// Number of prior messages in the conversation.
    pub history_len: usize,
    /// Approximate running token count of the conversation.
    pub approx_tokens: u32,
    /// Whether the current turn is part of a product-search flow.
    pub product_search: bool,
    /// Tenant identifier for usage accounting, if known.
    pub organization_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn intent_round_trips_snake_case() {
        assert_eq!(Intent::AppointmentNew.to_string(), "appointment_new");
        assert_eq!(
            Intent::from_str("appointment_reschedule").unwrap(),
            Intent::AppointmentReschedule
        );
        assert!(Intent::from_str("make_me_a_sandwich").is_err());
    }

    #[test]
    fn allowed_intents_exclude_unknown() {
        assert!(!Intent::allowed().contains(&Intent::Unknown));
        assert!(Intent::allowed().contains(&Intent::Negotiation));
    }

    #[test]
    fn sales_phase_ordering() {
        assert!(SalesPhase::Onboarding < SalesPhase::Closing);
        assert!(SalesPhase::Closing < SalesPhase::Completed);
        assert_eq!(SalesPhase::NeedPayoff.to_string(), "NEED_PAYOFF");
        assert_eq!(
            SalesPhase::from_str("IMPLICATION").unwrap(),
            SalesPhase::Implication
        );
    }

    #[test]
    fn provider_level_display() {
        assert_eq!(ProviderLevel::L1.to_string(), "l1");
        assert_eq!(ProviderLevel::from_str("l3").unwrap(), ProviderLevel::L3);
    }

    #[test]
    fn chat_message_constructors_tag_roles() {
        assert_eq!(ChatMessage::system("s").role, ChatRole::System);
        assert_eq!(ChatMessage::user("u").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").role, ChatRole::Assistant);
    }

    #[test]
    fn entities_default_is_empty() {
        assert!(Entities::default().is_empty());
        let e = Entities {
            product_name: Some("plan pro".into()),
            ..Default::default()
        };
        assert!(!e.is_empty());
    }
}
