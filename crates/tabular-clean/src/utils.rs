//! Shared utilities for analysis and cleaning.
//!
//! Helpers used across modules: dtype classification, literal parsing for
//! type inference, whitespace normalization and report rounding.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

// =============================================================================
// Literal Parsing Utilities
// =============================================================================

// Base-10 literal: optional sign, digits with optional fraction (or a bare
// fraction), optional exponent. Rejects hex, inf, nan and separators.
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid regex: numeric literal")
});

static INTEGER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("Invalid regex: integer literal"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace run"));

/// Check if a token is a base-10 numeric literal (surrounding whitespace allowed).
///
/// # Example
///
/// ```rust,ignore
/// assert!(is_numeric_literal(" 3.5e2 "));
/// assert!(!is_numeric_literal("0x1F"));
/// assert!(!is_numeric_literal("inf"));
/// ```
pub fn is_numeric_literal(s: &str) -> bool {
    NUMERIC_LITERAL.is_match(s.trim())
}

/// Parse a numeric literal as f64. Returns `None` for anything
/// [`is_numeric_literal`] rejects.
pub fn parse_float_literal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if !NUMERIC_LITERAL.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an integer literal as i64. Returns `None` for non-integers and for
/// integers that overflow i64.
pub fn parse_int_literal(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if !INTEGER_LITERAL.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Parse `true`/`false` (case-insensitive, surrounding whitespace allowed).
pub fn parse_bool_literal(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// =============================================================================
// String Utilities
// =============================================================================

/// Trim a string and collapse every internal whitespace run to one space.
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round to `places` decimal places.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage `part / whole * 100`, 0 when `whole` is 0, rounded to 2 places.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round_to(part as f64 / whole as f64 * 100.0, 2)
    }
}

// =============================================================================
// Tests
// =============================================================================
