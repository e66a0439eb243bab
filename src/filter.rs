//! Inclusive date-range filtering over rows
//!
//! A filter range restricts which rows participate in aggregation. Both
//! bounds are optional; filtering is opt-in, so with no bound set every row
//! passes whether or not it carries a date. Once either bound is set, rows
//! without a parsable date are excluded along with out-of-window rows.

use crate::value::Row;
use crate::{DeckError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Optional inclusive date window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Create a range from optional bounds
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// The range with no bounds; filtering with it is the identity
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check if neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check a date against the window (inclusive on both ends)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    /// Check a row against the window.
    ///
    /// The unbounded range admits every row. Under any bound, a row whose
    /// `date_column` value does not coerce to a date is unfilterable and is
    /// excluded.
    pub fn admits(&self, row: &Row, date_column: &str) -> bool {
        if self.is_unbounded() {
            return true;
        }
        row.date(date_column).is_some_and(|date| self.contains(date))
    }
}

/// Parse optional ISO date bounds as supplied by an outer surface.
///
/// # Errors
///
/// Returns `ValidationError` when a supplied bound is not a `YYYY-MM-DD`
/// date.
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let parse = |label: &str, value: Option<&str>| -> Result<Option<NaiveDate>> {
        match value {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    DeckError::ValidationError(format!(
                        "Invalid {} date '{}' (expected YYYY-MM-DD)",
                        label, s
                    ))
                }),
        }
    };
    Ok(DateRange::new(
        parse("start", start)?,
        parse("end", end)?,
    ))
}

/// Filter rows by date window, preserving input order.
///
/// Row admission follows [`DateRange::admits`].
pub fn apply<'a>(rows: &'a [Row], date_column: &str, range: &DateRange) -> Vec<&'a Row> {
    rows.iter()
        .filter(|row| range.admits(row, date_column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RawValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated_row(iso: &str) -> Row {
        let mut row = Row::new();
        row.insert("Date", RawValue::Text(iso.to_string()));
        row
    }

    fn undated_row() -> Row {
        let mut row = Row::new();
        row.insert("Date", RawValue::Text("not-a-date".to_string()));
        row
    }

    #[test]
    fn test_unbounded_is_identity() {
        let rows = vec![dated_row("2024-01-01"), undated_row(), dated_row("2024-03-01")];
        let filtered = apply(&rows, "Date", &DateRange::unbounded());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let rows = vec![
            dated_row("2024-01-01"),
            dated_row("2024-01-15"),
            dated_row("2024-01-31"),
        ];
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let filtered = apply(&rows, "Date", &range);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_out_of_window_rows_excluded() {
        let rows = vec![
            dated_row("2023-12-31"),
            dated_row("2024-01-15"),
            dated_row("2024-02-01"),
        ];
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let filtered = apply(&rows, "Date", &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date("Date"), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_start_only() {
        let rows = vec![dated_row("2024-01-01"), dated_row("2024-06-01")];
        let range = DateRange::new(Some(date(2024, 3, 1)), None);
        let filtered = apply(&rows, "Date", &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date("Date"), Some(date(2024, 6, 1)));
    }

    #[test]
    fn test_end_only() {
        let rows = vec![dated_row("2024-01-01"), dated_row("2024-06-01")];
        let range = DateRange::new(None, Some(date(2024, 3, 1)));
        let filtered = apply(&rows, "Date", &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].date("Date"), Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_undated_rows_excluded_once_bounded() {
        let rows = vec![dated_row("2024-01-15"), undated_row()];
        let range = DateRange::new(Some(date(2024, 1, 1)), None);
        let filtered = apply(&rows, "Date", &range);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_preserves_order() {
        let rows = vec![
            dated_row("2024-01-03"),
            dated_row("2024-01-01"),
            dated_row("2024-01-02"),
        ];
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 3)));
        let filtered = apply(&rows, "Date", &range);
        let dates: Vec<_> = filtered.iter().filter_map(|r| r.date("Date")).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 3), date(2024, 1, 1), date(2024, 1, 2)]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = vec![
            dated_row("2024-01-01"),
            dated_row("2024-02-01"),
            undated_row(),
        ];
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let once: Vec<Row> = apply(&rows, "Date", &range).into_iter().cloned().collect();
        let twice = apply(&once, "Date", &range);
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_parse_range() {
        let range = parse_range(Some("2024-01-01"), Some("2024-02-01")).unwrap();
        assert_eq!(range.start, Some(date(2024, 1, 1)));
        assert_eq!(range.end, Some(date(2024, 2, 1)));

        let range = parse_range(None, None).unwrap();
        assert!(range.is_unbounded());

        assert!(parse_range(Some("01/01/2024"), None).is_err());
        assert!(parse_range(None, Some("yesterday")).is_err());
    }
}
