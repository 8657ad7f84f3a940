// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sales-phase tags embedded in generated text.
//!
//! The generation prompt asks the model to append `[PHASE:NAME]` when the
//! conversation advances. The tag is advisory; no ordering is enforced.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use vendia_core::types::SalesPhase;

static PHASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[PHASE:([A-Z_]+)\]").unwrap());

/// Extracts the first phase tag from `text` and strips every tag occurrence.
///
/// Unrecognized phase names are stripped but yield no phase.
pub fn extract_phase_tag(text: &str) -> (Option<SalesPhase>, String) {
    let phase = PHASE_TAG
        .captures(text)
        .and_then(|c| SalesPhase::from_str(&c[1]).ok());
    let stripped = PHASE_TAG.replace_all(text, "").trim().to_string();
    (phase, stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_extracted_and_stripped() {
        let (phase, text) = extract_phase_tag("Entiendo tu situación. [PHASE:PROBLEM]");
        assert_eq!(phase, Some(SalesPhase::Problem));
        assert_eq!(text, "Entiendo tu situación.");
    }

    #[test]
    fn no_tag_passes_through() {
        let (phase, text) = extract_phase_tag("Hola, ¿cómo estás?");
        assert_eq!(phase, None);
        assert_eq!(text, "Hola, ¿cómo estás?");
    }

    #[test]
    fn unknown_phase_is_stripped_without_value() {
        let (phase, text) = extract_phase_tag("Listo. [PHASE:PARTY_TIME]");
        assert_eq!(phase, None);
        assert_eq!(text, "Listo.");
    }

    #[test]
    fn multi_word_phase() {
        let (phase, _) = extract_phase_tag("Ok [PHASE:NEED_PAYOFF]");
        assert_eq!(phase, Some(SalesPhase::NeedPayoff));
    }
}
