// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed intent classifier with cache, deterministic fallback, and
//! entity enrichment.
//!
//! Contract: [`IntentClassifier::classify`] never fails for provider or
//! parse errors -- every such failure degrades to the regex fallback. Only
//! programmer errors propagate (there are none on this path).

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, warn};
use vendia_core::traits::GenerationProvider;
use vendia_core::types::{
    ChatMessage, ChatRequest, ClassificationMethod, ClassificationResult, ConversationContext,
    Entities, Intent,
};
use vendia_core::VendiaError;
use vendia_nlu::datetime;
use vendia_nlu::fallback::FallbackClassifier;

use crate::cache::ClassificationCache;
use crate::metrics::ClassifierMetrics;

/// Confidence substituted when the provider emits a missing or out-of-range value.
const DEFAULT_LLM_CONFIDENCE: f32 = 0.8;

/// Token budget for a classification call; the JSON answer is tiny.
const CLASSIFY_MAX_TOKENS: u32 = 256;

/// Why the LLM path did not produce a result.
enum LlmFailure {
    /// Provider call failed (network, API). Fallback reasoning is annotated.
    Provider(VendiaError),
    /// Provider answered but the JSON was unusable. Fallback is silent;
    /// robustness is preferred over surfacing the malformation.
    Unparseable,
}

/// Raw shape the provider is instructed to emit.
#[derive(Debug, Deserialize)]
struct LlmClassification {
    intent: Option<String>,
    confidence: Option<f32>,
    reasoning: Option<String>,
    #[serde(default)]
    entities: LlmEntities,
}

#[derive(Debug, Default, Deserialize)]
struct LlmEntities {
    target_date: Option<String>,
    target_time: Option<String>,
    product_name: Option<String>,
}

/// Orchestrates cache, LLM provider, regex fallback, and entity enrichment.
pub struct IntentClassifier {
    provider: Option<Arc<dyn GenerationProvider>>,
    fallback: FallbackClassifier,
    cache: Arc<ClassificationCache>,
    metrics: Arc<ClassifierMetrics>,
}

impl IntentClassifier {
    /// Creates a classifier. `provider = None` means the regex fallback
    /// handles every message.
    pub fn new(provider: Option<Arc<dyn GenerationProvider>>, cache: Arc<ClassificationCache>) -> Self {
        Self {
            provider,
            fallback: FallbackClassifier::new(),
            cache,
            metrics: Arc::new(ClassifierMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<ClassifierMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Classifies one inbound message.
    ///
    /// Pipeline: cache lookup -> LLM (if configured) -> regex fallback on
    /// failure -> entity enrichment -> cache write (skipped for `unknown`)
    /// -> metrics log.
    pub async fn classify(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> ClassificationResult {
        let started = Instant::now();

        if let Some(hit) = self.cache.get(message) {
            self.metrics.record(&hit);
            return hit;
        }

        let reference = Utc::now().date_naive();

        let mut result = match &self.provider {
            Some(provider) => {
                match self.classify_llm(provider.as_ref(), message, context).await {
                    Ok(result) => result,
                    Err(LlmFailure::Provider(e)) => {
                        warn!(error = %e, "LLM classification failed, using fallback");
                        let mut result = self.fallback.classify(message, reference);
                        result.reasoning =
                            format!("provider failed ({e}); {}", result.reasoning);
                        result
                    }
                    Err(LlmFailure::Unparseable) => {
                        debug!("unparseable classification JSON, using fallback");
                        self.fallback.classify(message, reference)
                    }
                }
            }
            None => self.fallback.classify(message, reference),
        };

        // Entity enrichment always runs on the raw message and only fills
        // fields the classifier left empty -- it never overrides.
        if result.entities.target_date.is_none() {
            result.entities.target_date = datetime::parse_relative_date(message, reference);
        }
        if result.entities.target_time.is_none() {
            result.entities.target_time = datetime::parse_time(message);
        }

        result.processing_time_ms = started.elapsed().as_millis() as u64;

        if result.intent != Intent::Unknown {
            self.cache.set(message, &result);
        }

        self.metrics.record(&result);
        result
    }

    async fn classify_llm(
        &self,
        provider: &dyn GenerationProvider,
        message: &str,
        context: &ConversationContext,
    ) -> Result<ClassificationResult, LlmFailure> {
        let request = ChatRequest {
            model: String::new(),
            messages: vec![
                ChatMessage::system(system_instruction(context)),
                ChatMessage::user(message),
            ],
            max_tokens: CLASSIFY_MAX_TOKENS,
            temperature: Some(0.0),
        };

        let response = provider
            .chat(request)
            .await
            .map_err(LlmFailure::Provider)?;

        let raw = extract_json_object(&response.content).ok_or(LlmFailure::Unparseable)?;
        let parsed: LlmClassification =
            serde_json::from_str(raw).map_err(|_| LlmFailure::Unparseable)?;

        Ok(into_result(parsed))
    }
}

/// Fixed system instruction: enumerates the allowed intents and requires
/// strict JSON output.
fn system_instruction(context: &ConversationContext) -> String {
    let intents = Intent::allowed()
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut instruction = format!(
        "You classify customer messages for a sales assistant. \
         Reply with strict JSON only, no prose, no markdown fences:\n\
         {{\"intent\": \"<one of: {intents}>\", \"confidence\": 0.0-1.0, \
         \"reasoning\": \"<short>\", \"entities\": {{\"target_date\": \"YYYY-MM-DD\" or null, \
         \"target_time\": \"HH:MM\" or null, \"product_name\": \"<name>\" or null}}}}"
    );

    if !context.recent_intents.is_empty() {
        let recent = context
            .recent_intents
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        instruction.push_str(&format!("\nRecent intents in this conversation: {recent}."));
    }
    if let Some(phase) = context.sales_phase {
        instruction.push_str(&format!("\nCurrent sales phase: {phase}."));
    }

    instruction
}

/// Applies post-parse defaults: missing intent -> unknown, out-of-range
/// confidence -> 0.8, missing entities -> empty.
fn into_result(parsed: LlmClassification) -> ClassificationResult {
    let intent = parsed
        .intent
        .as_deref()
        .and_then(|raw| Intent::from_str(raw).ok())
        .unwrap_or(Intent::Unknown);

    let confidence = match parsed.confidence {
        Some(c) if (0.0..=1.0).contains(&c) => c,
        _ => DEFAULT_LLM_CONFIDENCE,
    };

    let entities = Entities {
        target_date: parsed
            .entities
            .target_date
            .as_deref()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        target_time: parsed
            .entities
            .target_time
            .as_deref()
            .and_then(|t| chrono::NaiveTime::parse_from_str(t, "%H:%M").ok()),
        product_name: parsed.entities.product_name,
    };

    ClassificationResult {
        intent,
        confidence,
        entities,
        method: ClassificationMethod::Llm,
        reasoning: parsed.reasoning.unwrap_or_default(),
        processing_time_ms: 0,
    }
}

/// Finds the first balanced top-level JSON object in possibly-noisy text
/// (providers occasionally wrap the answer in fences or prose).
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            if c != '\\' {
                escaped = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
