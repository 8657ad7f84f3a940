// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic regex-based intent classifier.
//!
//! Serves both as the fast path when no LLM provider is configured and as
//! the safety net when the provider fails. The classifier is an ordered rule
//! table: the first intent whose pattern matches wins, with table order as
//! the tie-break.

use std::time::Instant;

use chrono::NaiveDate;
use regex::Regex;
use vendia_core::types::{ClassificationMethod, ClassificationResult, Entities, Intent};

use crate::datetime;

/// Fixed confidence for social intents (greeting, confirmation, negation).
const SOCIAL_CONFIDENCE: f32 = 0.85;

/// Fixed confidence for all other pattern-matched intents.
const PATTERN_CONFIDENCE: f32 = 0.65;

/// One row of the ordered rule table.
struct IntentRule {
    intent: Intent,
    pattern: Regex,
    confidence: f32,
}

/// Ordered regex table over nine intents, evaluated first-match-wins.
pub struct FallbackClassifier {
    rules: Vec<IntentRule>,
}

impl FallbackClassifier {
    /// Builds the rule table. Patterns match against lowercased,
    /// accent-folded text.
    pub fn new() -> Self {
        let rule = |intent: Intent, pattern: &str, confidence: f32| IntentRule {
            intent,
            // Patterns are compile-time constants; a failure here is a
            // programmer error, not an input error.
            pattern: Regex::new(pattern).unwrap(),
            confidence,
        };

        let rules = vec![
            rule(
                Intent::AppointmentNew,
                r"\b(agendar|reservar|programar|apartar)\b|\b(quiero|quisiera|necesito|me gustaria) (una )?(cita|reunion|visita|demo)\b|\bnueva cita\b",
                PATTERN_CONFIDENCE,
            ),
            rule(
                Intent::AppointmentReschedule,
                r"\b(reprogramar|reagendar|posponer)\b|\b(cambiar|mover) (la |mi |el )?(cita|reunion|hora|fecha)\b|\botro (dia|horario)\b",
                PATTERN_CONFIDENCE,
            ),
            rule(
                Intent::AppointmentCancel,
                r"\b(cancelar|anular|suspender)\b|\bya no (puedo|podre|quiero)\b",
                PATTERN_CONFIDENCE,
            ),
            rule(
                Intent::QuoteRequest,
                r"\b(cotizacion|cotizar|presupuesto|precio|tarifa)\b|\bcuanto (cuesta|vale|sale|cobran)\b",
                PATTERN_CONFIDENCE,
            ),
            rule(
                Intent::ProductInfo,
                r"\b(informacion|detalles|caracteristicas|especificaciones|catalogo)\b|\bque incluye\b|\bcomo funciona\b",
                PATTERN_CONFIDENCE,
            ),
            rule(
                Intent::HumanHandoff,
                r"\b(hablar|comunicarme|contactar) con (un |una |el |la )?(humano|persona|asesor|asesora|agente|alguien)\b|\bpasame con\b|\bun humano\b",
                PATTERN_CONFIDENCE,
            ),
            rule(
                Intent::Greeting,
                r"^\s*(hola|buenos dias|buenas tardes|buenas noches|buenas|hey|que tal|saludos)\b",
                SOCIAL_CONFIDENCE,
            ),
            rule(
                Intent::Confirmation,
                r"^\s*si\b|\b(claro|perfecto|de acuerdo|confirmo|confirmado|esta bien|dale|ok|okay|correcto|por supuesto)\b",
                SOCIAL_CONFIDENCE,
            ),
            rule(
                Intent::Negation,
                r"^\s*no\b|\b(mejor no|no gracias|no quiero|no me interesa|negativo)\b",
                SOCIAL_CONFIDENCE,
            ),
        ];

        Self { rules }
    }

    /// Classifies a message against the rule table.
    ///
    /// `reference` anchors relative date extraction ("mañana"). Returns
    /// `Unknown` with confidence 0.0 when no pattern matches.
    pub fn classify(&self, message: &str, reference: NaiveDate) -> ClassificationResult {
        let started = Instant::now();
        let normalized = normalize(message);

        let matched = self
            .rules
            .iter()
            .find(|rule| rule.pattern.is_match(&normalized));

        let entities = Entities {
            target_date: datetime::parse_relative_date(message, reference),
            target_time: datetime::parse_time(message),
            product_name: None,
        };

        let (intent, confidence, reasoning) = match matched {
            Some(rule) => (
                rule.intent,
                rule.confidence,
                format!("matched fallback pattern for {}", rule.intent),
            ),
            None => (Intent::Unknown, 0.0, "no fallback pattern matched".to_string()),
        };

        ClassificationResult {
            intent,
            confidence,
            entities,
            method: ClassificationMethod::Fallback,
            reasoning,
            processing_time_ms: started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for FallbackClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercases and folds accented characters, mirroring the datetime parser.
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
