//! In-memory DataFrame row source
//!
//! Adapts a Polars DataFrame into the raw row representation the engine
//! consumes. Temporal columns are normalized to day-level dates here, so the
//! rest of the crate never sees sub-day precision.

use crate::value::{RawValue, Row};
use crate::{DeckError, Result};
use polars::prelude::*;

/// Row source over an in-memory Polars DataFrame
#[derive(Debug)]
pub struct DataFrameSource {
    frame: DataFrame,
}

impl DataFrameSource {
    /// Wrap an already-loaded DataFrame
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Access the underlying DataFrame
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows in the underlying frame
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

impl super::RowSource for DataFrameSource {
    fn column_names(&self) -> Result<Vec<String>> {
        Ok(self
            .frame
            .get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect())
    }

    fn rows(&self) -> Result<Vec<Row>> {
        let columns = self.frame.get_columns();
        let mut rows = Vec::with_capacity(self.frame.height());
        for idx in 0..self.frame.height() {
            let mut row = Row::new();
            for column in columns {
                let value = cell_value(column.as_materialized_series(), idx)?;
                row.insert(column.name().as_str(), value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Get a single cell from a series at a given index as a raw value
fn cell_value(series: &Series, idx: usize) -> Result<RawValue> {
    use DataType::*;

    match series.dtype() {
        Int32 => {
            let ca = series
                .i32()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to i32: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Number(v as f64))
                .unwrap_or(RawValue::Null))
        }
        Int64 => {
            let ca = series
                .i64()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to i64: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Number(v as f64))
                .unwrap_or(RawValue::Null))
        }
        UInt32 => {
            let ca = series
                .u32()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to u32: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Number(v as f64))
                .unwrap_or(RawValue::Null))
        }
        UInt64 => {
            let ca = series
                .u64()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to u64: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Number(v as f64))
                .unwrap_or(RawValue::Null))
        }
        Float32 => {
            let ca = series
                .f32()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to f32: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Number(v as f64))
                .unwrap_or(RawValue::Null))
        }
        Float64 => {
            let ca = series
                .f64()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to f64: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(RawValue::Number)
                .unwrap_or(RawValue::Null))
        }
        Boolean => {
            let ca = series
                .bool()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to bool: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Text(if v { "true" } else { "false" }.to_string()))
                .unwrap_or(RawValue::Null))
        }
        String => {
            let ca = series
                .str()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to string: {}", e)))?;
            Ok(ca
                .get(idx)
                .map(|v| RawValue::Text(v.to_string()))
                .unwrap_or(RawValue::Null))
        }
        Date => {
            let ca = series
                .date()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to date: {}", e)))?;
            Ok(ca
                .phys
                .get(idx)
                .and_then(days_to_date)
                .map(RawValue::Date)
                .unwrap_or(RawValue::Null))
        }
        Datetime(time_unit, _) => {
            let ca = series
                .datetime()
                .map_err(|e| DeckError::SourceError(format!("Failed to cast to datetime: {}", e)))?;
            Ok(ca
                .phys
                .get(idx)
                .and_then(|timestamp| {
                    let micros = match time_unit {
                        TimeUnit::Microseconds => timestamp,
                        TimeUnit::Milliseconds => timestamp * 1_000,
                        TimeUnit::Nanoseconds => timestamp / 1_000,
                    };
                    timestamp_to_date(micros)
                })
                .map(RawValue::Date)
                .unwrap_or(RawValue::Null))
        }
        Null => Ok(RawValue::Null),
        _ => {
            // Fallback: convert to text through the display form
            let value = series
                .get(idx)
                .map_err(|e| DeckError::SourceError(format!("Failed to read cell: {}", e)))?;
            Ok(match value {
                AnyValue::Null => RawValue::Null,
                other => RawValue::Text(other.to_string()),
            })
        }
    }
}

/// Days since the Unix epoch to a calendar date
fn days_to_date(days: i32) -> Option<chrono::NaiveDate> {
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)?;
    Some(epoch + chrono::Duration::days(days as i64))
}

/// Epoch timestamp in microseconds to a day-level date
fn timestamp_to_date(micros: i64) -> Option<chrono::NaiveDate> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(micros.div_euclid(1_000_000), 0)
        .map(|dt| dt.date_naive())
}
