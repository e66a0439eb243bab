//! NVD3 payload writer
//!
//! Emits the JSON payload shapes the NVD3 chart models consume. Each kind
//! has its own layout quirk: line models take a list of keyed series, the
//! discrete bar model wraps its values the same way, the pie model takes a
//! bare label/value array, and the box plot model takes an unkeyed series
//! whose per-group values are quartile objects.

use crate::aggregate::{BarPoint, BoxPoint, ScatterSeries, SeriesPoint};
use crate::api::ChartData;
use crate::manifest::{ChartKind, ChartSpec};
use crate::{DeckError, Result};
use serde_json::{json, Value};

use super::Writer;

/// Writer producing NVD3 chart model payloads
pub struct Nvd3Writer;

impl Nvd3Writer {
    /// Create a new NVD3 writer
    pub fn new() -> Self {
        Self
    }

    /// Payload for line-family models: one keyed series of x/y points,
    /// with dates rendered as ISO `YYYY-MM-DD` strings
    fn series_payload(&self, key: &str, points: &[SeriesPoint]) -> Value {
        let values: Vec<Value> = points
            .iter()
            .map(|p| {
                json!({
                    "x": p.date.format("%Y-%m-%d").to_string(),
                    "y": p.value,
                })
            })
            .collect();
        json!([{ "key": key, "values": values }])
    }

    /// Payload for the discrete bar model: one keyed series of label/value
    /// points
    fn bars_payload(&self, key: &str, points: &[BarPoint]) -> Value {
        let values: Vec<Value> = points
            .iter()
            .map(|p| json!({ "label": p.label, "value": p.value }))
            .collect();
        json!([{ "key": key, "values": values }])
    }

    /// Payload for the pie model: a bare label/value array
    fn pie_payload(&self, points: &[BarPoint]) -> Value {
        Value::Array(
            points
                .iter()
                .map(|p| json!({ "label": p.label, "value": p.value }))
                .collect(),
        )
    }

    /// Payload for the box plot model: an unkeyed series whose values carry
    /// the quartile object per group
    fn boxes_payload(&self, points: &[BoxPoint]) -> Value {
        let values: Vec<Value> = points
            .iter()
            .map(|p| {
                json!({
                    "label": p.label,
                    "values": {
                        "Q1": p.q1,
                        "Q2": p.q2,
                        "Q3": p.q3,
                        "whisker_low": p.whisker_low,
                        "whisker_high": p.whisker_high,
                    },
                })
            })
            .collect();
        json!([{ "values": values }])
    }

    /// Build the payload value for a chart without serializing it
    ///
    /// # Errors
    ///
    /// Returns `DeckError::WriterError` if the aggregate shape does not fit
    /// the descriptor kind.
    pub fn payload(&self, spec: &ChartSpec, data: &ChartData) -> Result<Value> {
        match (spec.kind, data) {
            (ChartKind::TimeSeries | ChartKind::CumulativeSeries, ChartData::Series(points)) => {
                Ok(self.series_payload(&spec.title, points))
            }
            (ChartKind::CategoricalBar, ChartData::Bars(points)) => {
                Ok(self.bars_payload(&spec.title, points))
            }
            (ChartKind::Pie, ChartData::Bars(points)) => Ok(self.pie_payload(points)),
            (ChartKind::BoxPlot, ChartData::Boxes(points)) => Ok(self.boxes_payload(points)),
            _ => Err(shape_mismatch(spec)),
        }
    }

    /// Payload for the scatter model: one keyed series per group
    pub fn scatter_payload(&self, series: &[ScatterSeries]) -> Value {
        Value::Array(
            series
                .iter()
                .map(|s| {
                    let values: Vec<Value> = s
                        .points
                        .iter()
                        .map(|p| json!({ "x": p.x, "y": p.y }))
                        .collect();
                    json!({ "key": s.label, "values": values })
                })
                .collect(),
        )
    }

    /// Serialize a scatter payload for the scatter model
    ///
    /// # Errors
    ///
    /// Returns `DeckError::WriterError` if serialization fails.
    pub fn write_scatter(&self, series: &[ScatterSeries]) -> Result<String> {
        to_pretty(&self.scatter_payload(series))
    }
}

impl Default for Nvd3Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for Nvd3Writer {
    fn write(&self, spec: &ChartSpec, data: &ChartData) -> Result<String> {
        to_pretty(&self.payload(spec, data)?)
    }

    fn validate(&self, spec: &ChartSpec, data: &ChartData) -> Result<()> {
        let compatible = matches!(
            (spec.kind, data),
            (
                ChartKind::TimeSeries | ChartKind::CumulativeSeries,
                ChartData::Series(_)
            ) | (
                ChartKind::CategoricalBar | ChartKind::Pie,
                ChartData::Bars(_)
            ) | (ChartKind::BoxPlot, ChartData::Boxes(_))
        );
        if compatible {
            Ok(())
        } else {
            Err(shape_mismatch(spec))
        }
    }
}

fn shape_mismatch(spec: &ChartSpec) -> DeckError {
    DeckError::WriterError(format!(
        "Chart '{}' of kind {:?} cannot render this aggregate shape",
        spec.id, spec.kind
    ))
}

fn to_pretty(payload: &Value) -> Result<String> {
    serde_json::to_string_pretty(payload)
        .map_err(|e| DeckError::WriterError(format!("Failed to serialize payload: {}", e)))
}
