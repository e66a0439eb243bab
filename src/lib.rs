/*!
# chartdeck - Dataset-to-Chart Aggregation

A small engine that turns a tabular marketing dataset into a paged deck of
renderer-ready charts.

chartdeck classifies dataset columns into roles (date, numeric, categorical),
derives a deterministic chart manifest from that structure, and serves
per-chart aggregates (time series, cumulative series, categorical bars, box
plot distributions, ratios, scatters) over a date-filterable row snapshot.

## Example

```rust,ignore
use chartdeck::api::Dataset;
use chartdeck::reader::{CsvSource, RowSource, StructureFile, StructureSource};
use chartdeck::writer::{Nvd3Writer, Writer};

let source = CsvSource::open("campaign.csv")?;
let structure = StructureFile::new("structure.json").structure()?;
let dataset = Dataset::load(structure, source.rows()?)?;

let writer = Nvd3Writer::new();
for spec in dataset.manifest() {
    let payload = writer.write(spec, &dataset.aggregate(spec))?;
    println!("{}", payload);
}
```

## Architecture

chartdeck splits the pipeline at the row snapshot:
- **Acquisition** → pluggable readers produce rows and structure (CSV files,
  Polars DataFrames, JSON structure manifests)
- **Derivation** → classification, manifest building, filtering, and
  aggregation are pure functions over the immutable snapshot
- **Output** → pluggable writers lay out renderer payloads (NVD3)

## Core Components

- [`value`] - Raw values, rows, and the coercion rules
- [`schema`] - Column classification and structure inference
- [`manifest`] - Chart descriptor derivation and pagination
- [`aggregate`] - The aggregation engine
- [`filter`] - Date-window filtering
- [`api`] - Dataset facade tying the stages together
- [`reader`] - Data acquisition layer
- [`writer`] - Payload output layer
*/

pub mod aggregate;
pub mod api;
pub mod filter;
pub mod manifest;
pub mod reader;
pub mod schema;
pub mod value;
pub mod writer;

// Re-export key types for convenience
pub use aggregate::{BarPoint, BoxPoint, ScatterPoint, ScatterSeries, SeriesPoint};
pub use api::{ChartData, Dataset};
pub use filter::DateRange;
pub use manifest::{ChartKind, ChartSpec, DEFAULT_PAGE_SIZE};
pub use schema::{ColumnDescriptor, Columns};
pub use value::{RawValue, Row};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    #[error("Structure error: {0}")]
    StructureError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Data source error: {0}")]
    SourceError(String),

    #[error("Duplicate chart id: {0}")]
    DuplicateChartId(String),

    #[error("Output generation error: {0}")]
    WriterError(String),
}

pub type Result<T> = std::result::Result<T, DeckError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::reader::{CsvSource, RowSource, StructureFile, StructureSource};
    use crate::schema::infer_structure;
    use crate::writer::{Nvd3Writer, Writer};
    use chrono::NaiveDate;
    use std::io::Write as _;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Contribution,Media_costs,Channel").unwrap();
        writeln!(file, "2024-01-01,100,50,TV").unwrap();
        writeln!(file, "2024-01-01,50,25,Web").unwrap();
        writeln!(file, "2024-01-02,30,15,TV").unwrap();
        file.flush().unwrap();
        file
    }

    fn sample_structure_json() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Date", "type": "date"}},
                {{"name": "Contribution", "type": "numeric"}},
                {{"name": "Media_costs", "type": "numeric"}},
                {{"name": "Channel", "type": "category"}}
            ]"#
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    fn load_sample() -> Dataset {
        let csv = sample_csv();
        let structure_file = sample_structure_json();
        let rows = CsvSource::open(csv.path()).unwrap().rows().unwrap();
        let structure = StructureFile::new(structure_file.path()).structure().unwrap();
        Dataset::load(structure, rows).unwrap()
    }

    #[test]
    fn test_end_to_end_csv_to_nvd3_payload() {
        // Complete pipeline: CSV → rows → manifest → aggregate → NVD3 JSON
        let dataset = load_sample();

        // two measures, one dimension: time series first, then bars
        let ids: Vec<&str> = dataset.manifest().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "contribution-over-time",
                "media-costs-over-time",
                "contribution-by-channel",
                "media-costs-by-channel",
            ]
        );

        let spec = dataset.find_chart("contribution-over-time").unwrap();
        let data = dataset.aggregate(spec);
        let json_str = Nvd3Writer::new().write(spec, &data).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(payload[0]["key"], "Contribution over time");
        assert_eq!(payload[0]["values"][0]["x"], "2024-01-01");
        assert_eq!(payload[0]["values"][0]["y"], 150.0);
        assert_eq!(payload[0]["values"][1]["x"], "2024-01-02");
        assert_eq!(payload[0]["values"][1]["y"], 30.0);
    }

    #[test]
    fn test_end_to_end_inferred_structure() {
        // Without a structure manifest, inference over typed CSV rows takes over
        let csv = sample_csv();
        let source = CsvSource::open(csv.path()).unwrap();
        let names = source.column_names().unwrap();
        let rows = source.rows().unwrap();

        let structure = infer_structure(&names, &rows);
        let kinds: Vec<&str> = structure.iter().map(|d| d.kind.as_str()).collect();
        assert_eq!(kinds, vec!["date", "numeric", "numeric", "category"]);

        let dataset = Dataset::load(structure, rows).unwrap();
        assert_eq!(dataset.manifest().len(), 4);
    }

    #[test]
    fn test_end_to_end_filtered_window() {
        let mut dataset = load_sample();
        dataset.apply_filter(DateRange::new(Some(date(2024, 1, 2)), None));

        let spec = dataset.find_chart("contribution-by-channel").unwrap();
        let json_str = Nvd3Writer::new()
            .write(spec, &dataset.aggregate(spec))
            .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        let values = payload[0]["values"].as_array().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["label"], "TV");
        assert_eq!(values[0]["value"], 30.0);
    }

    #[test]
    fn test_end_to_end_ratio_and_scatter() {
        let dataset = load_sample();

        // TV: 130 / 65, Web: 50 / 25
        let ratio = dataset.ratio("Channel", "Contribution", "Media_costs");
        assert_eq!(ratio.len(), 2);
        assert_eq!(ratio[0].label, "TV");
        assert_eq!(ratio[0].value, 2.0);
        assert_eq!(ratio[1].value, 2.0);

        let scatter = dataset.scatter("Channel", "Media_costs", "Contribution");
        let json_str = Nvd3Writer::new().write_scatter(&scatter).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(payload[0]["key"], "TV");
        assert_eq!(payload[0]["values"].as_array().unwrap().len(), 2);
        assert_eq!(payload[0]["values"][0]["x"], 50.0);
        assert_eq!(payload[0]["values"][0]["y"], 100.0);
        assert_eq!(payload[1]["key"], "Web");
    }

    #[test]
    fn test_end_to_end_paged_deck() {
        let dataset = load_sample();
        // four charts fit one default-sized page
        assert_eq!(dataset.page_count(DEFAULT_PAGE_SIZE), 1);
        let deck = dataset.aggregate_page(1, DEFAULT_PAGE_SIZE);
        assert_eq!(deck.len(), 4);
        let writer = Nvd3Writer::new();
        for (spec, data) in &deck {
            assert!(writer.write(spec, data).is_ok());
        }
    }
}
