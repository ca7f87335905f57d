//! Structured-payload extraction from free-form model replies
//!
//! Model replies are untrusted text: the payload may be wrapped in markdown
//! fences, prefixed with chatter, shaped as `key: value` lines, or replaced
//! entirely by an `Error:` sentinel. This module locates and decodes whatever
//! structure is present and classifies the result once, so downstream code
//! never re-checks presence by hand.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Classified batch payload from a receipt-style reply.
#[derive(Debug)]
pub enum Payload {
    /// Structured elements, with an optional advisory note alongside.
    /// An empty list is a valid "zero transactions detected" result.
    List {
        items: Vec<Value>,
        note: Option<String>,
    },
    /// No records; the model explained why. Not a failure.
    Note(String),
}

/// Truncate raw model text for inclusion in error messages.
fn truncate_raw(s: &str) -> String {
    if s.len() > 200 {
        let mut end = 200;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}

/// Detect the model's explicit rejection sentinel ("Error: <reason>").
fn sentinel_reason(text: &str) -> Option<String> {
    let trimmed = text.trim();
    match trimmed.get(..6) {
        Some(head) if head.eq_ignore_ascii_case("error:") => {
            Some(trimmed[6..].trim().to_string())
        }
        _ => None,
    }
}

/// Strip a wrapping markdown fence (``` or ```json) if present.
fn strip_fences(s: &str) -> &str {
    let s = s.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest,
    };
    let rest = rest.trim_end();
    match rest.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => rest,
    }
}

/// Decode the first JSON value embedded in `text`.
///
/// Tries the whole text first, then falls back to scanning for the outermost
/// `{...}` or `[...]` span, tolerating chatter before and after the payload.
fn embedded_json(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let object_span = match (text.find('{'), text.rfind('}')) {
        (Some(s), Some(e)) if s < e => Some((s, &text[s..=e])),
        _ => None,
    };
    let array_span = match (text.find('['), text.rfind(']')) {
        (Some(s), Some(e)) if s < e => Some((s, &text[s..=e])),
        _ => None,
    };

    // Prefer whichever span starts first; an array wrapping objects starts
    // before the objects it contains.
    let span = match (object_span, array_span) {
        (Some((os, o)), Some((as_, a))) => {
            if as_ < os {
                a
            } else {
                o
            }
        }
        (Some((_, o)), None) => o,
        (None, Some((_, a))) => a,
        (None, None) => {
            return Err(Error::Extraction(format!(
                "no structured block found | Raw: {}",
                truncate_raw(text)
            )))
        }
    };

    serde_json::from_str(span).map_err(|e| {
        Error::Extraction(format!("invalid JSON: {} | Raw: {}", e, truncate_raw(span)))
    })
}

/// Extract a single JSON object from a fenced (or bare) reply.
///
/// Used for the text pipelines that ask the model for one record. The
/// `Error:` sentinel is surfaced as [`Error::Rejected`], a caller-level
/// condition distinct from extraction failure.
pub fn fenced_object(raw: &str) -> Result<Map<String, Value>> {
    let inner = strip_fences(raw);
    if let Some(reason) = sentinel_reason(inner) {
        return Err(Error::Rejected(reason));
    }

    match embedded_json(inner)? {
        Value::Object(map) => Ok(map),
        Value::String(s) => match sentinel_reason(&s) {
            Some(reason) => Err(Error::Rejected(reason)),
            None => Err(Error::Extraction(format!(
                "expected an object, got a string | Raw: {}",
                truncate_raw(&s)
            ))),
        },
        other => Err(Error::Extraction(format!(
            "expected an object | Raw: {}",
            truncate_raw(&other.to_string())
        ))),
    }
}

/// Accumulate `key: value` lines into a JSON object with string values.
///
/// Lines not matching the pattern are ignored; a missing key is not an error
/// here: the per-field coercers supply defaults downstream.
pub fn line_object(raw: &str) -> Result<Map<String, Value>> {
    let trimmed = raw.trim();
    if let Some(reason) = sentinel_reason(trimmed) {
        return Err(Error::Rejected(reason));
    }

    let mut map = Map::new();
    for line in trimmed.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if !key.is_empty() {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
    Ok(map)
}

/// Classify a batch (receipt) reply.
///
/// Accepts the expected `{"transactions": [...]}` envelope, and also a bare
/// top-level array: the model disobeying the envelope but still delivering
/// content is honored rather than failed.
pub fn payload(raw: &str) -> Result<Payload> {
    let inner = strip_fences(raw);
    if let Some(reason) = sentinel_reason(inner) {
        return Err(Error::Rejected(reason));
    }

    match embedded_json(inner)? {
        Value::Array(items) => Ok(Payload::List { items, note: None }),
        Value::Object(mut map) => {
            let note = map
                .get("note")
                .and_then(Value::as_str)
                .map(|s| s.to_string());
            match map.remove("transactions") {
                Some(Value::Array(items)) => Ok(Payload::List { items, note }),
                Some(other) => Err(Error::Extraction(format!(
                    "transactions is not an array | Raw: {}",
                    truncate_raw(&other.to_string())
                ))),
                None => match note {
                    Some(n) => Ok(Payload::Note(n)),
                    None => Err(Error::Extraction(format!(
                        "missing transactions key | Raw: {}",
                        truncate_raw(inner)
                    ))),
                },
            }
        }
        Value::String(s) => match sentinel_reason(&s) {
            Some(reason) => Err(Error::Rejected(reason)),
            None => Ok(Payload::Note(s)),
        },
        other => Err(Error::Extraction(format!(
            "unexpected payload shape | Raw: {}",
            truncate_raw(&other.to_string())
        ))),
    }
}
