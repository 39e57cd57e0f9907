//! Raw-string to typed-value conversion.
//!
//! All conversion is invariant: the same raw string converts to the same
//! value regardless of process locale. The rules per kind:
//!
//! - `String`: always succeeds, input returned unchanged (empty included)
//! - `Int`: optional surrounding ASCII whitespace, optional sign, base-10
//! - `Double`: invariant decimal, optional exponent, thousands separators
//!   accepted only between digits; non-finite values are rejected
//! - `Bool`: case-insensitive `true`/`false`, plus `1` and `0`
//!
//! [`try_convert`] never fails loudly; [`convert`] is the strict companion
//! for callers that want a hard error.

use crate::core::entry::ValueKind;
use crate::core::error::{TidelineError, TidelineResult};

/// A configuration value after conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

impl ConfigValue {
    /// The kind tag this value carries.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::Bool(_) => ValueKind::Bool,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Convert a raw value to the target kind, or `None` when it does not parse.
pub fn try_convert(raw: &str, kind: ValueKind) -> Option<ConfigValue> {
    match kind {
        ValueKind::String => Some(ConfigValue::String(raw.to_string())),
        ValueKind::Int => parse_int(raw).map(ConfigValue::Int),
        ValueKind::Double => parse_double(raw).map(ConfigValue::Double),
        ValueKind::Bool => parse_bool(raw).map(ConfigValue::Bool),
    }
}

/// Strict companion to [`try_convert`]: converts or fails loudly.
pub fn convert(raw: &str, kind: ValueKind) -> TidelineResult<ConfigValue> {
    try_convert(raw, kind).ok_or_else(|| TidelineError::NotConvertible {
        value: raw.to_string(),
        kind,
    })
}

/// Types a raw configuration value can be read as.
///
/// Implemented for `String`, `i64`, `f64` and `bool`, matching the four
/// stored kinds. The facade's generic lookups are bounded by this trait.
pub trait FromRaw: Sized {
    /// Kind tag corresponding to this Rust type.
    fn kind() -> ValueKind;

    /// Parse the raw string, or `None` when it does not convert.
    fn from_raw(raw: &str) -> Option<Self>;
}

impl FromRaw for String {
    fn kind() -> ValueKind {
        ValueKind::String
    }

    fn from_raw(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromRaw for i64 {
    fn kind() -> ValueKind {
        ValueKind::Int
    }

    fn from_raw(raw: &str) -> Option<Self> {
        parse_int(raw)
    }
}

impl FromRaw for f64 {
    fn kind() -> ValueKind {
        ValueKind::Double
    }

    fn from_raw(raw: &str) -> Option<Self> {
        parse_double(raw)
    }
}

impl FromRaw for bool {
    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn from_raw(raw: &str) -> Option<Self> {
        parse_bool(raw)
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_double(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Thousands separators are valid only between digits.
    let bytes = trimmed.as_bytes();
    let mut cleaned = String::with_capacity(trimmed.len());
    for (i, &b) in bytes.iter().enumerate() {
        if b == b',' {
            let between_digits = i > 0
                && bytes[i - 1].is_ascii_digit()
                && i + 1 < bytes.len()
                && bytes[i + 1].is_ascii_digit();
            if !between_digits {
                return None;
            }
            continue;
        }
        cleaned.push(b as char);
    }

    // Invariant decimal only: no `inf`, `NaN` or other alphabetic spellings.
    if cleaned
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(false);
    }
    match trimmed {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_accepts_anything() {
        assert_eq!(
            try_convert("hello", ValueKind::String),
            Some(ConfigValue::String("hello".to_string()))
        );
        assert_eq!(
            try_convert("", ValueKind::String),
            Some(ConfigValue::String(String::new()))
        );
    }

    #[test]
    fn test_int_parsing() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-100"), Some(-100));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("  13  "), Some(13));
        assert_eq!(parse_int("12.5"), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn test_double_parsing() {
        assert_eq!(parse_double("3.14"), Some(3.14));
        assert_eq!(parse_double("-10.25"), Some(-10.25));
        assert_eq!(parse_double("1e3"), Some(1000.0));
        assert_eq!(parse_double("1,234.5"), Some(1234.5));
        assert_eq!(parse_double(",5"), None);
        assert_eq!(parse_double("5,"), None);
        assert_eq!(parse_double("NaN"), None);
        assert_eq!(parse_double("inf"), None);
        assert_eq!(parse_double(""), None);
    }

    #[test]
    fn test_bool_parsing() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("2"), None);
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_strict_form_fails_loudly() {
        let err = convert("abc", ValueKind::Int).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }
}
