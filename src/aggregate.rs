//! Grouping and reduction over rows
//!
//! Pure functions that turn a row set into chart-ready aggregates: grouped
//! sums, date-keyed series, cumulative series, categorical bars, ratios,
//! distribution summaries, and scatter series. Nothing here mutates its
//! input or fails on dirty data; numeric fields coerce totally (0 for
//! anything unparsable) and group keys default to `"Unknown"`.
//!
//! Group iteration is ordered: categorical keys lexicographically, date keys
//! chronologically. Repeated calls on the same input produce identical
//! output.

use crate::value::Row;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Aggregate Point Types
// =============================================================================

/// One point of a date-keyed series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One bar of a categorical aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

/// Distribution summary of one group: quartiles plus min/max whiskers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPoint {
    pub label: String,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
}

/// One (x, y) point of a scatter series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// One group's scatter series, points in row order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub label: String,
    pub points: Vec<ScatterPoint>,
}

// =============================================================================
// Grouping
// =============================================================================

/// Group rows by the categorical coercion of `key`.
///
/// Missing and empty key values group under `"Unknown"`. The returned map
/// iterates in lexicographic key order.
pub fn group_by<'a, I>(rows: I, key: &str) -> BTreeMap<String, Vec<&'a Row>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut groups: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.category(key)).or_default().push(row);
    }
    groups
}

/// Group rows by the date coercion of `date_key`, chronologically.
///
/// Rows whose value does not coerce to a date are skipped; they cannot
/// participate in a date-keyed aggregate.
pub fn group_by_date<'a, I>(rows: I, date_key: &str) -> BTreeMap<NaiveDate, Vec<&'a Row>>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut groups: BTreeMap<NaiveDate, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        if let Some(date) = row.date(date_key) {
            groups.entry(date).or_default().push(row);
        }
    }
    groups
}

// =============================================================================
// Reductions
// =============================================================================

/// Sum the numeric coercion of `field` over rows. Empty input sums to 0.
pub fn sum_by<'a, I>(rows: I, field: &str) -> f64
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter().map(|row| row.number(field)).sum()
}

/// One point per distinct date, ascending, valued at the group sum of
/// `measure`. Rows sharing a calendar date merge into one point.
pub fn time_series<'a, I>(rows: I, date_key: &str, measure: &str) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Row>,
{
    group_by_date(rows, date_key)
        .into_iter()
        .map(|(date, group)| SeriesPoint {
            date,
            value: sum_by(group, measure),
        })
        .collect()
}

/// Running sum of the time series, ascending by date.
///
/// Monotonic non-decreasing when the measure is non-negative.
pub fn cumulative_series<'a, I>(rows: I, date_key: &str, measure: &str) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut running = 0.0;
    time_series(rows, date_key, measure)
        .into_iter()
        .map(|point| {
            running += point.value;
            SeriesPoint {
                date: point.date,
                value: running,
            }
        })
        .collect()
}

/// One bar per distinct dimension key, valued at the group sum of `measure`,
/// in lexicographic key order.
pub fn categorical_bars<'a, I>(rows: I, dimension: &str, measure: &str) -> Vec<BarPoint>
where
    I: IntoIterator<Item = &'a Row>,
{
    group_by(rows, dimension)
        .into_iter()
        .map(|(label, group)| BarPoint {
            label,
            value: sum_by(group, measure),
        })
        .collect()
}

/// Per-group ratio of summed `numerator` to summed `denominator`.
///
/// A zero denominator is replaced by 1, so the bar degrades to the raw
/// numerator sum instead of dividing by zero. That is a deliberate policy:
/// the value is not a true ratio when the denominator is legitimately zero.
pub fn ratio_bars<'a, I>(
    rows: I,
    dimension: &str,
    numerator: &str,
    denominator: &str,
) -> Vec<BarPoint>
where
    I: IntoIterator<Item = &'a Row>,
{
    group_by(rows, dimension)
        .into_iter()
        .map(|(label, group)| {
            let numerator_sum = sum_by(group.iter().copied(), numerator);
            let mut denominator_sum = sum_by(group, denominator);
            if denominator_sum == 0.0 {
                denominator_sum = 1.0;
            }
            BarPoint {
                label,
                value: numerator_sum / denominator_sum,
            }
        })
        .collect()
}

/// Per-group distribution summary of `measure`: quartiles by linear
/// interpolation plus min/max whiskers.
pub fn distribution<'a, I>(rows: I, dimension: &str, measure: &str) -> Vec<BoxPoint>
where
    I: IntoIterator<Item = &'a Row>,
{
    group_by(rows, dimension)
        .into_iter()
        .map(|(label, group)| {
            let mut values: Vec<f64> = group.iter().map(|row| row.number(measure)).collect();
            values.sort_by(|a, b| a.total_cmp(b));
            BoxPoint {
                label,
                q1: quantile(&values, 0.25),
                q2: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                whisker_low: values.first().copied().unwrap_or(0.0),
                whisker_high: values.last().copied().unwrap_or(0.0),
            }
        })
        .collect()
}

/// Per-group scatter series of (`x`, `y`) numeric coercions, points in row
/// order within each group.
pub fn scatter_groups<'a, I>(rows: I, dimension: &str, x: &str, y: &str) -> Vec<ScatterSeries>
where
    I: IntoIterator<Item = &'a Row>,
{
    group_by(rows, dimension)
        .into_iter()
        .map(|(label, group)| ScatterSeries {
            label,
            points: group
                .iter()
                .map(|row| ScatterPoint {
                    x: row.number(x),
                    y: row.number(y),
                })
                .collect(),
        })
        .collect()
}

/// Linear-interpolation quantile over sorted values: rank `h = p * (n - 1)`,
/// interpolating between the order statistics at `floor(h)` and `ceil(h)`.
/// Empty input yields 0.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let h = p * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
