//! Flexible timestamp parsing for exported trading records.
//!
//! Resolution order:
//! 1. 10-digit tokens are Unix seconds, 13-digit tokens Unix milliseconds.
//! 2. [`EXPLICIT_FORMATS`], first match wins.
//! 3. A best-effort fallback (RFC 3339, RFC 2822, [`FALLBACK_FORMATS`]).
//!
//! Anything else yields `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::error::ParseError;
use super::frame::Cell;

/// Ordered pattern list. Earlier entries take precedence over later ones.
pub const EXPLICIT_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
];

const FALLBACK_FORMATS: [&str; 16] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d %b %Y",
    "%b %d %Y",
];

/// Parse a textual timestamp. Never fails loudly.
pub fn parse_datetime(token: &str) -> Option<NaiveDateTime> {
    try_parse_datetime(token).ok()
}

/// Same as [`parse_datetime`] but reports the offending token.
pub fn try_parse_datetime(token: &str) -> Result<NaiveDateTime, ParseError> {
    let s = token.trim();
    if s.is_empty() {
        return Err(ParseError::datetime(token));
    }

    if let Some(dt) = parse_epoch(s) {
        return Ok(dt);
    }

    for fmt in EXPLICIT_FORMATS {
        if let Some(dt) = parse_with_format(s, fmt) {
            return Ok(dt);
        }
    }

    parse_fallback(s).ok_or_else(|| ParseError::datetime(token))
}

/// Timestamp from a spreadsheet/frame cell.
pub fn parse_cell_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_datetime(s),
        Cell::Number(v) if v.is_finite() && v.fract() == 0.0 && *v >= 0.0 => {
            parse_datetime(&format!("{:.0}", v))
        }
        _ => None,
    }
}

fn parse_epoch(s: &str) -> Option<NaiveDateTime> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = s.parse().ok()?;
    match s.len() {
        10 => DateTime::from_timestamp(value, 0).map(|dt| dt.naive_utc()),
        13 => DateTime::from_timestamp_millis(value).map(|dt| dt.naive_utc()),
        _ => None,
    }
}

fn parse_with_format(s: &str, fmt: &str) -> Option<NaiveDateTime> {
    if fmt.contains("%H") {
        NaiveDateTime::parse_from_str(s, fmt).ok()
    } else {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

fn parse_fallback(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| parse_with_format(s, fmt))
        .or_else(|| parse_compact_date(s))
}

fn parse_compact_date(s: &str) -> Option<NaiveDateTime> {
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return parse_with_format(s, "%Y%m%d");
    }
    None
}
