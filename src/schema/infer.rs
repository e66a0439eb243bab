//! Structure inference for datasets that arrive without a manifest
//!
//! Scans each column's values and declares a kind: columns whose non-empty
//! values are all plain digit runs (spreadsheet date serials) are dates,
//! columns whose values all parse as numbers are numeric, everything else is
//! categorical. A column with no values at all is categorical.

use crate::schema::{kind, ColumnDescriptor};
use crate::value::{format_number, RawValue, Row};

/// Upper bound on rows examined per column during inference
pub const INFER_SAMPLE_ROWS: usize = 1000;

/// Infer a structure manifest from column names and raw rows.
///
/// One descriptor per name, in input order, examining at most
/// [`INFER_SAMPLE_ROWS`] rows. Intended for sources that ship no
/// `structure.json`; a declared manifest always takes precedence over
/// inference.
pub fn infer_structure(names: &[String], rows: &[Row]) -> Vec<ColumnDescriptor> {
    let sample = &rows[..rows.len().min(INFER_SAMPLE_ROWS)];
    names
        .iter()
        .map(|name| {
            let values: Vec<&RawValue> = sample.iter().filter_map(|row| row.get(name)).collect();
            ColumnDescriptor::new(name.clone(), infer_kind(&values))
        })
        .collect()
}

/// Infer the kind of one column from its values.
fn infer_kind(values: &[&RawValue]) -> &'static str {
    let mut numeric = true;
    let mut date_like = true;
    let mut has_value = false;

    for value in values {
        match value {
            RawValue::Null => continue,
            RawValue::Text(s) if s.is_empty() => continue,
            RawValue::Text(s) => {
                has_value = true;
                if !s.chars().all(|c| c.is_ascii_digit()) {
                    date_like = false;
                }
                if s.trim().parse::<f64>().is_err() {
                    numeric = false;
                }
            }
            RawValue::Number(n) => {
                has_value = true;
                // digit-run check on the numeric form: integral and unsigned
                if n.fract() != 0.0 || *n < 0.0 {
                    date_like = false;
                }
            }
            // a column that arrives already typed needs no heuristics
            RawValue::Date(_) => return kind::DATE,
        }
    }

    if !has_value {
        return kind::CATEGORY;
    }
    // The width gate looks at the first cell only: short digit runs like
    // "123" are identifiers or counts, five-plus digits are date serials.
    if date_like && first_cell_width(values) >= 5 {
        return kind::DATE;
    }
    if numeric {
        kind::NUMERIC
    } else {
        kind::CATEGORY
    }
}

/// Textual width of the first cell in a column (0 when null/absent).
fn first_cell_width(values: &[&RawValue]) -> usize {
    match values.first() {
        Some(RawValue::Text(s)) => s.len(),
        Some(RawValue::Number(n)) => format_number(*n).len(),
        Some(RawValue::Date(_)) => 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(column: &str, values: Vec<RawValue>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert(column, v);
                row
            })
            .collect()
    }

    fn infer_one(column: &str, values: Vec<RawValue>) -> String {
        let rows = rows_of(column, values);
        let structure = infer_structure(&[column.to_string()], &rows);
        structure[0].kind.clone()
    }

    #[test]
    fn test_infer_date_from_serials() {
        let kind = infer_one(
            "Date",
            vec![
                RawValue::Text("45292".to_string()),
                RawValue::Text("45293".to_string()),
            ],
        );
        assert_eq!(kind, "date");
    }

    #[test]
    fn test_infer_date_from_numeric_serials() {
        let kind = infer_one(
            "Date",
            vec![RawValue::Number(45292.0), RawValue::Number(45293.0)],
        );
        assert_eq!(kind, "date");
    }

    #[test]
    fn test_infer_numeric() {
        let kind = infer_one(
            "Spend",
            vec![
                RawValue::Text("10.5".to_string()),
                RawValue::Text("-3".to_string()),
            ],
        );
        assert_eq!(kind, "numeric");
    }

    #[test]
    fn test_infer_category() {
        let kind = infer_one(
            "Channel",
            vec![
                RawValue::Text("TV".to_string()),
                RawValue::Text("Web".to_string()),
            ],
        );
        assert_eq!(kind, "category");
    }

    #[test]
    fn test_infer_short_digit_runs_are_numeric() {
        // all digits, but the first cell is under five characters wide
        let kind = infer_one(
            "Count",
            vec![
                RawValue::Text("123".to_string()),
                RawValue::Text("456".to_string()),
            ],
        );
        assert_eq!(kind, "numeric");
    }

    #[test]
    fn test_infer_empty_column_is_category() {
        let kind = infer_one(
            "Empty",
            vec![RawValue::Null, RawValue::Text("".to_string())],
        );
        assert_eq!(kind, "category");
    }

    #[test]
    fn test_infer_mixed_text_breaks_date_and_numeric() {
        let kind = infer_one(
            "Mixed",
            vec![
                RawValue::Text("45292".to_string()),
                RawValue::Text("TV".to_string()),
            ],
        );
        assert_eq!(kind, "category");
    }

    #[test]
    fn test_infer_typed_date_column() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let kind = infer_one("Date", vec![RawValue::Date(d)]);
        assert_eq!(kind, "date");
    }

    #[test]
    fn test_infer_nulls_are_skipped() {
        let kind = infer_one(
            "Spend",
            vec![
                RawValue::Null,
                RawValue::Number(7.0),
                RawValue::Null,
            ],
        );
        assert_eq!(kind, "numeric");
    }

    #[test]
    fn test_infer_structure_orders_by_input() {
        let mut row = Row::new();
        row.insert("B", RawValue::Number(1.5));
        row.insert("A", RawValue::Text("x".to_string()));
        let structure = infer_structure(&["A".to_string(), "B".to_string()], &[row]);
        assert_eq!(structure[0], ColumnDescriptor::new("A", "category"));
        assert_eq!(structure[1], ColumnDescriptor::new("B", "numeric"));
    }

    #[test]
    fn test_infer_caps_the_sample() {
        let mut values: Vec<RawValue> = (0..INFER_SAMPLE_ROWS)
            .map(|n| RawValue::Number(n as f64))
            .collect();
        values.push(RawValue::Text("beyond the sample".to_string()));
        let kind = infer_one("Spend", values);
        assert_eq!(kind, "numeric");
    }
}
