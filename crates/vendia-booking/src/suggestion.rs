// SPDX-FileCopyrightText: 2026 Vendia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of structured booking suggestions embedded in generated text.
//!
//! The generation backend never books directly; it embeds a JSON payload
//! inline in otherwise free-form text. The payload is located by scanning
//! for the `"suggested_action"` marker, extracting the surrounding balanced
//! JSON object, and stripping it from the user-visible reply.

use serde::{Deserialize, Serialize};

/// Marker that identifies a suggestion payload inside generated text.
const MARKER: &str = "\"suggested_action\"";

/// One proposed appointment slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotProposal {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
}

/// The embedded suggestion wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
    pub client_request_id: String,
    pub proposals: Vec<SlotProposal>,
    pub confidence: f64,
}

impl SuggestedAction {
    pub fn is_booking(&self) -> bool {
        self.kind == "suggested_action" && self.action == "book_appointment"
    }
}

/// Finds a booking suggestion in `text` and returns it together with the
/// text with the payload removed. Returns `None` when no parseable booking
/// suggestion is present.
///
/// Candidate objects are tried from the `{` nearest the marker outward, so
/// a stray brace inside a string field that the model ordered before the
/// marker only costs one failed parse, never the payload.
pub fn extract_suggestion(text: &str) -> Option<(SuggestedAction, String)> {
    let marker_at = text.find(MARKER)?;
    let bytes = text.as_bytes();

    for start in (0..=marker_at).rev().filter(|&i| bytes[i] == b'{') {
        let Some(end) = object_end(text, start) else {
            continue;
        };
        if end <= marker_at {
            continue;
        }
        let Ok(action) = serde_json::from_str::<SuggestedAction>(&text[start..end]) else {
            continue;
        };
        if !action.is_booking() {
            return None;
        }

        let mut stripped = String::with_capacity(text.len() - (end - start));
        stripped.push_str(&text[..start]);
        stripped.push_str(&text[end..]);
        return Some((action, stripped.trim().to_string()));
    }
    None
}

/// Returns the exclusive end offset of the balanced JSON object opening at
/// `start`, counting braces outside string literals only.
fn object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    in_string = false;
                    escaped = false;
                }
                _ => escaped = false,
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(request_id: &str) -> String {
        format!(
            r#"{{"type":"suggested_action","action":"book_appointment","client_request_id":"{request_id}","proposals":[{{"date":"2026-03-04","time":"15:00"}}],"confidence":0.9}}"#
        )
    }

    #[test]
    fn extracts_and_strips_embedded_payload() {
        let text = format!(
            "¡Perfecto! Te propongo el miércoles a las 3.\n{}\n¿Te funciona?",
            payload("req-1")
        );
        let (action, stripped) = extract_suggestion(&text).unwrap();
        assert_eq!(action.client_request_id, "req-1");
        assert_eq!(action.proposals.len(), 1);
        assert_eq!(action.proposals[0].date, "2026-03-04");
        assert_eq!(action.proposals[0].time, "15:00");
        assert!(!stripped.contains("suggested_action"));
        assert!(stripped.contains("¿Te funciona?"));
    }

    #[test]
    fn plain_text_has_no_suggestion() {
        assert!(extract_suggestion("Hola, ¿en qué puedo ayudarte?").is_none());
    }

    #[test]
    fn non_booking_action_is_ignored() {
        let text = r#"{"type":"suggested_action","action":"send_brochure","client_request_id":"x","proposals":[],"confidence":0.5}"#;
        assert!(extract_suggestion(text).is_none());
    }

    #[test]
    fn malformed_payload_is_ignored() {
        let text = r#"claro {"suggested_action": "book_appointment" oops"#;
        assert!(extract_suggestion(text).is_none());
    }

    #[test]
    fn payload_with_braces_in_strings() {
        let text = format!(
            r#"Antes {{de}} nada: {}"#,
            payload("req-2")
        );
        let (action, _) = extract_suggestion(&text).unwrap();
        assert_eq!(action.client_request_id, "req-2");
    }

    #[test]
    fn brace_in_string_field_before_marker() {
        // Models reorder keys; a braced string ahead of "type" must not
        // derail extraction.
        let text = r#"Claro. {"note":"ver {detalle} adjunto","type":"suggested_action","action":"book_appointment","client_request_id":"req-9","proposals":[{"date":"2026-03-04","time":"15:00"}],"confidence":0.8} ¿Te va bien?"#;
        let (action, stripped) = extract_suggestion(text).unwrap();
        assert_eq!(action.client_request_id, "req-9");
        assert!(!stripped.contains("suggested_action"));
        assert!(stripped.contains("¿Te va bien?"));
    }

    #[test]
    fn whole_message_payload_strips_to_empty() {
        let (action, stripped) = extract_suggestion(&payload("req-3")).unwrap();
        assert!(action.is_booking());
        assert!(stripped.is_empty());
    }
}
