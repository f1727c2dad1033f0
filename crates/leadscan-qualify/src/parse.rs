//! Tolerant parsing of model replies.
//!
//! Model output is prose that usually wraps a JSON object. Parsing tries,
//! in order, a fenced code block, the first balanced `{...}` span that decodes, and the
//! whole trimmed text; the first step that yields a JSON object wins. When
//! every step fails a keyword-heuristic fallback object is returned, so
//! [`parse_model_response`] never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)\s*```").expect("valid fence regex"));

const INTENT_KEYWORDS: [&str; 8] = [
    "looking",
    "contact",
    "buy",
    "sell",
    "rent",
    "property",
    "apartment",
    "house",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    FencedBlock,
    BraceSpan,
    WholeText,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub fields: Map<String, Value>,
    pub strategy: ParseStrategy,
}

#[must_use]
pub fn parse_model_response(raw: &str) -> ParsedResponse {
    let trimmed = raw.trim();

    for caps in FENCED_BLOCK.captures_iter(trimmed) {
        if let Some(fields) = caps.get(1).and_then(|m| parse_object(m.as_str())) {
            return ParsedResponse {
                fields,
                strategy: ParseStrategy::FencedBlock,
            };
        }
    }

    let mut from = 0;
    while let Some(start) = trimmed[from..].find('{').map(|i| from + i) {
        if let Some(fields) = balanced_span(&trimmed[start..]).and_then(parse_object) {
            return ParsedResponse {
                fields,
                strategy: ParseStrategy::BraceSpan,
            };
        }
        from = start + 1;
    }

    if let Some(fields) = parse_object(trimmed) {
        return ParsedResponse {
            fields,
            strategy: ParseStrategy::WholeText,
        };
    }

    tracing::debug!(chars = raw.len(), "model reply not parseable; using keyword fallback");
    ParsedResponse {
        fields: fallback_fields(raw),
        strategy: ParseStrategy::Fallback,
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// The `{...}` span opening at the start of `text`, matched while ignoring
/// braces inside string literals.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn fallback_fields(raw: &str) -> Map<String, Value> {
    let lowered = raw.to_lowercase();
    let has_lead_intent = INTENT_KEYWORDS.iter().any(|k| lowered.contains(k));
    let value = json!({
        "has_lead_intent": has_lead_intent,
        "confidence": 0.5,
        "extracted_info": {
            "property_type": "unknown",
            "location": "unknown",
            "budget": "unknown",
            "contact": "unknown"
        }
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
