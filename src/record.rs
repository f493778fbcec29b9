//! Raw and normalized record shapes plus permissive field parsing
//!
//! Every field of a [`RawRecord`] is optional text: an absent column and an
//! empty cell both map to `None`. Parsing helpers never error; any value
//! that cannot be interpreted degrades to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Canonical column layout of the usage table, also used for export.
pub const USAGE_COLUMNS: [&str; 7] = [
    "date",
    "model",
    "user_text",
    "topic",
    "tts",
    "is_solved",
    "fit_score",
];

/// One usage row in canonical shape, after column-alias resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub date: Option<String>,
    pub model: Option<String>,
    pub user_text: Option<String>,
    pub topic: Option<String>,
    pub tts: Option<String>,
    pub is_solved: Option<String>,
    pub fit: Option<String>,
    /// Optional explicit turn count column.
    pub turn: Option<String>,
    /// Optional conversation column holding a JSON list of messages.
    pub conversation: Option<String>,
}

/// Analysis-ready record. Construction guarantees the store invariant:
/// a record always has a parsed date and non-empty model and topic.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub date: NaiveDateTime,
    pub model: String,
    pub topic: String,
    pub user_text: String,
    /// Time-to-solve proxy (estimated conversational turns), if known.
    pub tts: Option<f64>,
    pub is_solved: bool,
    /// Fit score as supplied; 0-1 vs 0-100 scale is a display concern.
    pub fit: Option<f64>,
}

impl NormalizedRecord {
    /// Day bucket key used by the trend aggregator ("YYYY-MM-DD").
    pub fn day_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Clean and parse a numeric field: trim, strip internal whitespace,
/// treat the first comma as a decimal point, reject non-finite values.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.replacen(',', ".", 1);
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a numeric field verbatim (trim only, no decimal-comma cleanup).
/// Used for the explicit solved flag, which is 0/1 in well-formed data.
pub fn parse_plain_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Permissive date parser. Accepts RFC 3339, common date-time layouts,
/// and plain dates (midnight). Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?);
        }
    }
    None
}

/// Probe a field for a JSON list. Only strings that start with `[` and end
/// with `]` are attempted; malformed JSON degrades to `None`.
pub fn parse_json_list(raw: &str) -> Option<Vec<Value>> {
    let t = raw.trim();
    if !(t.starts_with('[') && t.ends_with(']')) {
        return None;
    }
    match serde_json::from_str::<Value>(t) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}
