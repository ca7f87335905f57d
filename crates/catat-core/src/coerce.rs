//! Field coercion for untrusted model output
//!
//! Every function here is total: whatever the model sent back (wrong type,
//! stray units, garbage text) resolves to the field's documented default.
//! Failures are logged, never raised, so a malformed field can not take down
//! the request that carried it.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

/// Multiplier table for amount unit suffixes. Indonesian shorthand and the
/// spelled-out English units map to the same magnitudes; `m` is milyar (1e9),
/// not million.
fn unit_multiplier(suffix: &str) -> Option<f64> {
    match suffix {
        "" => Some(1.0),
        "k" | "rb" | "ribu" | "thousand" => Some(1e3),
        "jt" | "juta" | "million" => Some(1e6),
        "m" | "b" | "milyar" | "miliar" | "billion" => Some(1e9),
        _ => None,
    }
}

/// Split a cleaned amount string into its numeric part and unit suffix.
fn split_number_suffix(s: &str) -> (String, String) {
    let mut num = String::new();
    let mut rest = String::new();
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() || c == '.' || c == ',' || (c == '-' && i == 0) {
            num.push(c);
        } else {
            rest = s[i..].trim().to_string();
            break;
        }
    }
    (num, rest)
}

/// True when every separator in the numeric part is a thousands group
/// ("15.000", "1,500,000"), as opposed to a decimal point ("1.5").
fn looks_grouped(num: &str) -> bool {
    let mut any = false;
    let bytes = num.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'.' || b == b',' {
            any = true;
            let digits = bytes[i + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if digits != 3 {
                return false;
            }
        }
    }
    any
}

fn parse_amount_str(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_lowercase();
    for token in ["rp.", "rp", "idr", "$"] {
        if let Some(stripped) = s.strip_prefix(token) {
            s = stripped.trim_start().to_string();
            break;
        }
    }

    let (num, suffix) = split_number_suffix(&s);
    if num.is_empty() {
        return None;
    }

    let cleaned = if looks_grouped(&num) {
        num.replace(['.', ','], "")
    } else {
        num.replace(',', ".")
    };

    let value: f64 = cleaned.parse().ok()?;
    let multiplier = unit_multiplier(&suffix)?;
    Some(value * multiplier)
}

/// Coerce an amount field to a full numeric value.
///
/// Numbers are taken at face value. Strings get currency symbols stripped and
/// unit suffixes (k/rb/ribu, jt/juta, m/milyar and English equivalents)
/// expanded. Anything unparseable is `0.0`.
pub fn amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_amount_str(s).unwrap_or_else(|| {
            warn!(raw = %s, "Unparseable amount, defaulting to 0");
            0.0
        }),
        Value::Null => 0.0,
        other => {
            warn!(raw = %other, "Non-numeric amount, defaulting to 0");
            0.0
        }
    }
}

fn parse_weight_str(raw: &str) -> Option<f64> {
    let s = raw.trim().to_lowercase();
    let (num, suffix) = split_number_suffix(&s);
    if num.is_empty() {
        return None;
    }
    let value: f64 = num.replace(',', ".").parse().ok()?;
    match suffix.as_str() {
        "" | "g" | "gr" | "gram" | "grams" => Some(value),
        "kg" => Some(value * 1000.0),
        _ => None,
    }
}

/// Coerce a mass field to grams. Bare numbers are already grams; `kg` scales
/// by 1000. Anything unparseable is `0.0`.
pub fn weight_grams(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_weight_str(s).unwrap_or_else(|| {
            warn!(raw = %s, "Unparseable weight, defaulting to 0.0");
            0.0
        }),
        Value::Null => 0.0,
        other => {
            warn!(raw = %other, "Non-numeric weight, defaulting to 0.0");
            0.0
        }
    }
}

/// Coerce a quantity to a positive integer, defaulting to 1.
pub fn quantity(value: &Value) -> i64 {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(q) if q >= 1 => q,
        _ => {
            if !value.is_null() {
                warn!(raw = %value, "Invalid quantity, defaulting to 1");
            }
            1
        }
    }
}

/// Coerce a date field to a `NaiveDate`.
///
/// Strict `YYYY-MM-DD` parsing. Parse failures fall back to `today`, and so
/// do dates strictly in the future: the model is never trusted to post-date
/// a transaction.
pub fn date(value: &Value, today: NaiveDate) -> NaiveDate {
    let raw = match value {
        Value::String(s) => s.trim(),
        _ => return today,
    };
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) if d > today => {
            warn!(raw = %raw, "Future date from model, using today");
            today
        }
        Ok(d) => d,
        Err(_) => {
            warn!(raw = %raw, "Unparseable date, using today");
            today
        }
    }
}

/// Coerce a free-text field, substituting `fallback` for anything empty.
pub fn text(value: &Value, fallback: &str) -> String {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };
    if s.is_empty() {
        fallback.to_string()
    } else {
        s
    }
}

/// Case-sensitive exact match against an allow-list, with fallback.
pub fn allow_listed(raw: &str, allowed: &[&str], fallback: &str) -> String {
    let candidate = raw.trim();
    if allowed.contains(&candidate) {
        candidate.to_string()
    } else {
        if !candidate.is_empty() {
            warn!(raw = %candidate, fallback = %fallback, "Value outside allow-list");
        }
        fallback.to_string()
    }
}

/// Strip the generic "emas " prefix users put before a brand name.
pub fn strip_metal_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.get(..5) {
        Some(head) if head.eq_ignore_ascii_case("emas ") => trimmed[5..].trim_start(),
        _ => trimmed,
    }
}
