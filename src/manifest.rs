//! Chart descriptors and manifest construction
//!
//! The manifest is the full ordered set of charts derivable from a dataset's
//! structure: one time series per numeric measure when a date column exists,
//! then one categorical bar per numeric measure and categorical dimension
//! pair. It is a pure function of the classified columns; identical structure
//! yields the identical manifest, ids included.

use crate::schema::Columns;
use crate::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of chart descriptors per page
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Kind of chart a descriptor requests.
///
/// `TimeSeries` and `CategoricalBar` are the kinds derived from structure.
/// The remaining kinds are specializations a renderer may request explicitly
/// against the same descriptor shape; they are never generated by
/// [`build_manifest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    TimeSeries,
    CumulativeSeries,
    CategoricalBar,
    Pie,
    BoxPlot,
}

/// One chart to draw: a measure, a dimension, and a stable unique id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub measure: String,
    pub dimension: String,
}

/// Deterministic slug of a column name for descriptor ids: lowercased, with
/// runs of non-alphanumeric characters collapsed to single dashes.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Build the ordered chart manifest from classified columns.
///
/// Emits the time-series pass first (one per numeric measure, when a date
/// column exists), then the numeric-by-categorical pass in declaration
/// order. This yields `|numeric| * (|categorical| + 1)` descriptors with a
/// date column and `|numeric| * |categorical|` without.
///
/// # Errors
///
/// Returns `DuplicateChartId` when two column names produce the same id
/// after slugging; the build aborts rather than silently overwriting a
/// chart.
pub fn build_manifest(columns: &Columns) -> Result<Vec<ChartSpec>> {
    let mut specs = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if let Some(date) = &columns.date {
        for measure in &columns.numeric {
            push_unique(
                &mut specs,
                &mut seen,
                ChartSpec {
                    id: format!("{}-over-time", slug(measure)),
                    title: format!("{} over time", measure),
                    kind: ChartKind::TimeSeries,
                    measure: measure.clone(),
                    dimension: date.clone(),
                },
            )?;
        }
    }

    for measure in &columns.numeric {
        for dimension in &columns.categorical {
            push_unique(
                &mut specs,
                &mut seen,
                ChartSpec {
                    id: format!("{}-by-{}", slug(measure), slug(dimension)),
                    title: format!("{} by {}", measure, dimension),
                    kind: ChartKind::CategoricalBar,
                    measure: measure.clone(),
                    dimension: dimension.clone(),
                },
            )?;
        }
    }

    Ok(specs)
}

fn push_unique(
    specs: &mut Vec<ChartSpec>,
    seen: &mut HashSet<String>,
    spec: ChartSpec,
) -> Result<()> {
    if !seen.insert(spec.id.clone()) {
        return Err(DeckError::DuplicateChartId(spec.id));
    }
    specs.push(spec);
    Ok(())
}

/// Slice the manifest into fixed-size pages.
///
/// Pages index from 1. An out-of-range page is empty, never an error; this
/// is pure slicing and carries no aggregation semantics.
pub fn page(specs: &[ChartSpec], page: usize, page_size: usize) -> &[ChartSpec] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= specs.len() {
        return &[];
    }
    let end = (start + page_size).min(specs.len());
    &specs[start..end]
}

/// Number of pages the manifest occupies at the given page size
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDescriptor, Columns};

    fn classified(date: bool, numeric: &[&str], categorical: &[&str]) -> Columns {
        let mut structure = Vec::new();
        if date {
            structure.push(ColumnDescriptor::new("Date", "date"));
        }
        for n in numeric {
            structure.push(ColumnDescriptor::new(*n, "numeric"));
        }
        for c in categorical {
            structure.push(ColumnDescriptor::new(*c, "category"));
        }
        Columns::classify(&structure)
    }

    #[test]
    fn test_manifest_count_with_date() {
        let columns = classified(true, &["Contribution", "Media_costs"], &["Channel", "Grouping"]);
        let specs = build_manifest(&columns).unwrap();
        // n * (c + 1) = 2 * 3
        assert_eq!(specs.len(), 6);
    }

    #[test]
    fn test_manifest_count_without_date() {
        let columns = classified(false, &["Contribution", "Media_costs"], &["Channel", "Grouping"]);
        let specs = build_manifest(&columns).unwrap();
        // n * c = 2 * 2
        assert_eq!(specs.len(), 4);
        assert!(specs.iter().all(|s| s.kind == ChartKind::CategoricalBar));
    }

    #[test]
    fn test_manifest_time_series_pass_comes_first() {
        let columns = classified(true, &["Contribution"], &["Channel"]);
        let specs = build_manifest(&columns).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].kind, ChartKind::TimeSeries);
        assert_eq!(specs[0].id, "contribution-over-time");
        assert_eq!(specs[0].dimension, "Date");
        assert_eq!(specs[1].kind, ChartKind::CategoricalBar);
        assert_eq!(specs[1].id, "contribution-by-channel");
    }

    #[test]
    fn test_manifest_is_deterministic() {
        let columns = classified(true, &["A", "B"], &["X", "Y"]);
        assert_eq!(
            build_manifest(&columns).unwrap(),
            build_manifest(&columns).unwrap()
        );
    }

    #[test]
    fn test_manifest_ids_unique() {
        let columns = classified(true, &["Contribution", "Media_costs"], &["Channel", "Grouping"]);
        let specs = build_manifest(&columns).unwrap();
        let ids: HashSet<_> = specs.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), specs.len());
    }

    #[test]
    fn test_slug_collapses_non_alphanumeric_runs() {
        assert_eq!(slug("Media_costs"), "media-costs");
        assert_eq!(slug("Media  Costs!"), "media-costs");
        assert_eq!(slug("  ROI (%)  "), "roi");
        assert_eq!(slug("Contribución"), "contribución");
    }

    #[test]
    fn test_duplicate_id_aborts_build() {
        // "Media_costs" and "Media costs" slug identically
        let columns = classified(true, &["Media_costs", "Media costs"], &[]);
        let err = build_manifest(&columns).unwrap_err();
        assert!(matches!(err, DeckError::DuplicateChartId(_)));
        assert!(err.to_string().contains("media-costs-over-time"));
    }

    #[test]
    fn test_empty_columns_empty_manifest() {
        let specs = build_manifest(&Columns::default()).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_page_slicing() {
        let columns = classified(true, &["A", "B", "C"], &["X"]);
        let specs = build_manifest(&columns).unwrap();
        assert_eq!(specs.len(), 6);

        assert_eq!(page(&specs, 1, 5).len(), 5);
        assert_eq!(page(&specs, 2, 5).len(), 1);
        assert_eq!(page(&specs, 3, 5).len(), 0);
        assert_eq!(page(&specs, 0, 5).len(), 0);
        assert_eq!(page(&specs, 1, 0).len(), 0);
        // slicing does not reorder
        assert_eq!(page(&specs, 2, 5)[0], specs[5]);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
        assert_eq!(page_count(10, 5), 2);
        assert_eq!(page_count(3, 0), 0);
    }

    #[test]
    fn test_chart_kind_serialization() {
        assert_eq!(
            serde_json::to_value(ChartKind::TimeSeries).unwrap(),
            serde_json::json!("time-series")
        );
        assert_eq!(
            serde_json::to_value(ChartKind::CategoricalBar).unwrap(),
            serde_json::json!("categorical-bar")
        );
        assert_eq!(
            serde_json::to_value(ChartKind::BoxPlot).unwrap(),
            serde_json::json!("box-plot")
        );
    }
}
