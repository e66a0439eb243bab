//! Raw cell values and row coercion
//!
//! This module defines the untyped value model delivered by row sources and
//! the per-kind coercions the aggregation pipeline relies on: total numeric
//! coercion (dirty data becomes 0, never NaN and never an error), categorical
//! coercion with an `"Unknown"` default, and date coercion that yields `None`
//! for anything that is not date-like.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Raw Value Type
// =============================================================================

/// Group key used for missing or empty categorical values
pub const UNKNOWN_KEY: &str = "Unknown";

/// Spreadsheet serial day numbers considered plausible dates.
/// Serial 1 maps to 1899-12-31; 2958465 maps to 9999-12-31.
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 2_958_465.0;

/// A single untyped cell value as delivered by a row source
///
/// Sources hand over whatever the underlying column held: numbers stay
/// numbers, text stays text, and columns that were already temporal arrive as
/// day-level dates. All interpretation happens through the coercions below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

/// Format number for display (remove trailing zeros for integers)
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Parse date-like text into a calendar date.
///
/// Accepts ISO dates, naive datetimes (`T` or space separated, optional
/// fractional seconds), and RFC3339 timestamps. Datetimes truncate to their
/// date component.
fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    None
}

/// Convert a spreadsheet serial day number to a calendar date.
///
/// Spreadsheet exports ship dates as integral day counts from 1899-12-30
/// (serial 45292 is 2024-01-01). Non-integral values and values outside the
/// plausible serial range are rejected.
fn serial_to_date(n: f64) -> Option<NaiveDate> {
    if n.fract() != 0.0 || !(SERIAL_MIN..=SERIAL_MAX).contains(&n) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    Some(epoch + Duration::days(n as i64))
}

impl RawValue {
    /// Numeric coercion. Total: never fails, never produces NaN.
    ///
    /// Numbers pass through, numeric text parses, everything else (null,
    /// non-numeric text, non-finite parses, dates) coerces to 0.
    pub fn number(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Categorical coercion. Missing/empty values group under `"Unknown"`.
    ///
    /// Numbers and dates render via their canonical key strings (integers
    /// without a trailing `.0`, dates as ISO).
    pub fn category(&self) -> String {
        match self {
            Self::Null => UNKNOWN_KEY.to_string(),
            Self::Text(s) if s.trim().is_empty() => UNKNOWN_KEY.to_string(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Date coercion. `None` when the value is not date-like.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => parse_date_text(s),
            Self::Number(n) => serial_to_date(*n),
            Self::Null => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

// =============================================================================
// Row Type
// =============================================================================

/// One data row: a mapping from column name to raw value.
///
/// Rows are immutable once loaded; every aggregation reads them through the
/// coercion accessors, which resolve missing fields to the same defaults as
/// dirty values (0 for numerics, `"Unknown"` for categoricals, `None` for
/// dates).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: HashMap<String, RawValue>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Set a field value
    pub fn insert(&mut self, column: impl Into<String>, value: RawValue) {
        self.fields.insert(column.into(), value);
    }

    /// Get the raw value of a field, if present
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.fields.get(column)
    }

    /// Numeric coercion of a field; absent fields count as 0
    pub fn number(&self, column: &str) -> f64 {
        self.fields.get(column).map(RawValue::number).unwrap_or(0.0)
    }

    /// Categorical coercion of a field; absent fields group under `"Unknown"`
    pub fn category(&self, column: &str) -> String {
        self.fields
            .get(column)
            .map(RawValue::category)
            .unwrap_or_else(|| UNKNOWN_KEY.to_string())
    }

    /// Date coercion of a field; `None` when absent or not date-like
    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.fields.get(column).and_then(RawValue::date)
    }

    /// Number of fields in this row
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, RawValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
