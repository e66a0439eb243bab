//! High-level dataset API.
//!
//! Two-stage API: `Dataset::load()` classifies the structure and builds the
//! chart manifest once; aggregates are then derived on demand, per chart,
//! against the currently applied date filter. The manifest never changes
//! under filtering, and every derivation reads an immutable snapshot.

use crate::aggregate::{self, BarPoint, BoxPoint, ScatterSeries, SeriesPoint};
use crate::filter::{self, DateRange};
use crate::manifest::{self, ChartKind, ChartSpec};
use crate::schema::{ColumnDescriptor, Columns};
use crate::value::Row;
use crate::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// Aggregated points for one chart, shaped per descriptor kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartData {
    /// Date-keyed points (time series, cumulative series)
    Series(Vec<SeriesPoint>),
    /// Label-keyed points (categorical bars, pies)
    Bars(Vec<BarPoint>),
    /// Distribution summaries (box plots)
    Boxes(Vec<BoxPoint>),
}

impl ChartData {
    /// Number of aggregate points
    pub fn len(&self) -> usize {
        match self {
            Self::Series(points) => points.len(),
            Self::Bars(points) => points.len(),
            Self::Boxes(points) => points.len(),
        }
    }

    /// Check if the aggregate holds no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded dataset: structure, rows, manifest, and the current filter
/// derivation.
///
/// Structure and manifest are fixed at load time. `apply_filter` recomputes
/// the filtered view; everything else is read-only. Rows are never mutated.
pub struct Dataset {
    structure: Vec<ColumnDescriptor>,
    columns: Columns,
    manifest: Vec<ChartSpec>,
    rows: Vec<Row>,
    range: DateRange,
    /// Indices into `rows` passing the current range, in row order
    view: Vec<usize>,
}

impl Dataset {
    /// Load a dataset from its structure manifest and raw rows.
    ///
    /// Classifies columns and builds the chart manifest once. An empty
    /// structure or row set loads fine and yields an empty manifest.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateChartId` when two columns produce colliding
    /// descriptor ids.
    pub fn load(structure: Vec<ColumnDescriptor>, rows: Vec<Row>) -> Result<Self> {
        let columns = Columns::classify(&structure);
        let manifest = manifest::build_manifest(&columns)?;
        let view = (0..rows.len()).collect();
        Ok(Self {
            structure,
            columns,
            manifest,
            rows,
            range: DateRange::unbounded(),
            view,
        })
    }

    /// The structure manifest the dataset was loaded with.
    pub fn structure(&self) -> &[ColumnDescriptor] {
        &self.structure
    }

    /// The classified column partitions.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// The full ordered chart manifest.
    pub fn manifest(&self) -> &[ChartSpec] {
        &self.manifest
    }

    /// Look up one chart descriptor by id.
    pub fn find_chart(&self, id: &str) -> Option<&ChartSpec> {
        self.manifest.iter().find(|spec| spec.id == id)
    }

    /// All loaded rows, unfiltered.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of loaded rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The currently applied filter range.
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Apply a date filter, replacing the current filtered view.
    ///
    /// The view is derived against the time dimension from classification;
    /// a dataset without a date column only ever filters to everything or,
    /// under a bound, to nothing date-keyed (no row has a parsable date in a
    /// nonexistent column).
    pub fn apply_filter(&mut self, range: DateRange) {
        self.range = range;
        let date_column = self.columns.date.as_deref().unwrap_or_default();
        self.view = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| range.admits(row, date_column))
            .map(|(index, _)| index)
            .collect();
    }

    /// The rows passing the current filter, in row order.
    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.view.iter().map(|&index| &self.rows[index]).collect()
    }

    /// The rows passing an explicit window, leaving the applied filter
    /// untouched.
    pub fn rows_in(&self, range: &DateRange) -> Vec<&Row> {
        let date_column = self.columns.date.as_deref().unwrap_or_default();
        filter::apply(&self.rows, date_column, range)
    }

    /// Compute one chart's aggregate over the current filtered view.
    ///
    /// Infallible: an empty view yields an empty aggregate, and dirty field
    /// values coerce per the row coercion rules.
    pub fn aggregate(&self, spec: &ChartSpec) -> ChartData {
        compute(spec, self.filtered_rows())
    }

    /// Compute one chart's aggregate over an explicit window.
    ///
    /// A per-request derivation for shared, read-only use of the dataset.
    pub fn aggregate_in(&self, spec: &ChartSpec, range: &DateRange) -> ChartData {
        compute(spec, self.rows_in(range))
    }

    /// Per-group ratio of two measures over the current filtered view.
    pub fn ratio(&self, dimension: &str, numerator: &str, denominator: &str) -> Vec<BarPoint> {
        aggregate::ratio_bars(self.filtered_rows(), dimension, numerator, denominator)
    }

    /// Per-group ratio of two measures over an explicit window.
    pub fn ratio_in(
        &self,
        dimension: &str,
        numerator: &str,
        denominator: &str,
        range: &DateRange,
    ) -> Vec<BarPoint> {
        aggregate::ratio_bars(self.rows_in(range), dimension, numerator, denominator)
    }

    /// Per-group scatter series of two measures over the current filtered
    /// view.
    pub fn scatter(&self, dimension: &str, x: &str, y: &str) -> Vec<ScatterSeries> {
        aggregate::scatter_groups(self.filtered_rows(), dimension, x, y)
    }

    /// Per-group scatter series of two measures over an explicit window.
    pub fn scatter_in(
        &self,
        dimension: &str,
        x: &str,
        y: &str,
        range: &DateRange,
    ) -> Vec<ScatterSeries> {
        aggregate::scatter_groups(self.rows_in(range), dimension, x, y)
    }

    /// One page of the manifest (pages index from 1).
    pub fn page(&self, page: usize, page_size: usize) -> &[ChartSpec] {
        manifest::page(&self.manifest, page, page_size)
    }

    /// Number of pages at the given page size.
    pub fn page_count(&self, page_size: usize) -> usize {
        manifest::page_count(self.manifest.len(), page_size)
    }

    /// Aggregate every chart of one page eagerly.
    pub fn aggregate_page(&self, page: usize, page_size: usize) -> Vec<(ChartSpec, ChartData)> {
        self.page(page, page_size)
            .iter()
            .map(|spec| (spec.clone(), self.aggregate(spec)))
            .collect()
    }
}

/// Run the engine operation a descriptor kind calls for
fn compute(spec: &ChartSpec, rows: Vec<&Row>) -> ChartData {
    match spec.kind {
        ChartKind::TimeSeries => {
            ChartData::Series(aggregate::time_series(rows, &spec.dimension, &spec.measure))
        }
        ChartKind::CumulativeSeries => ChartData::Series(aggregate::cumulative_series(
            rows,
            &spec.dimension,
            &spec.measure,
        )),
        ChartKind::CategoricalBar | ChartKind::Pie => ChartData::Bars(
            aggregate::categorical_bars(rows, &spec.dimension, &spec.measure),
        ),
        ChartKind::BoxPlot => ChartData::Boxes(aggregate::distribution(
            rows,
            &spec.dimension,
            &spec.measure,
        )),
    }
}
