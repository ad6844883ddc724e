//! # Temporal Recognition
//!
//! Decides whether a JSON value denotes a calendar date for the `Date` type
//! tag. Recognition is lenient on purpose: the tag accepts the formats a
//! client would plausibly send, not one canonical encoding.
//!
//! Accepted inputs:
//!
//! - Numbers: milliseconds since the Unix epoch, finite and within
//!   ±8.64e15 (the representable range of an ECMAScript time value).
//! - Strings: RFC 3339, RFC 2822, `YYYY-MM-DDTHH:MM[:SS[.fff]]` and
//!   `YYYY-MM-DD HH:MM:SS` without offset, `YYYY-MM-DD`, `YYYY-MM`, `YYYY`.
//!
//! Every other value, including booleans and objects, is not a date.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Largest absolute epoch offset in milliseconds that still denotes a date.
pub const MAX_EPOCH_MILLIS: f64 = 8.64e15;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Returns true if `value` is a string or number that parses as a date.
pub fn is_valid_date(value: &Value) -> bool {
    match value {
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|ms| ms.is_finite() && ms.abs() <= MAX_EPOCH_MILLIS),
        Value::String(s) => parse_date_str(s).is_some(),
        _ => false,
    }
}

/// Parse a date string in any accepted format, normalised to a naive
/// timestamp. Offset-bearing inputs are converted to UTC first.
pub fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }

    // Partial ISO dates: `YYYY-MM` and `YYYY`.
    let partial = match s.len() {
        7 => format!("{s}-01"),
        4 if s.bytes().all(|b| b.is_ascii_digit()) => format!("{s}-01-01"),
        _ => return None,
    };
    NaiveDate::parse_from_str(&partial, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
