//! Column structure model and classification
//!
//! A dataset arrives with a structure manifest: an ordered list of column
//! descriptors declaring each column's semantic kind. Classification
//! partitions those columns into the sets the manifest builder and the
//! aggregation pipeline work from.

pub mod infer;

pub use infer::{infer_structure, INFER_SAMPLE_ROWS};

use serde::{Deserialize, Serialize};

/// Declared column kind strings, matched case-sensitively
pub mod kind {
    pub const DATE: &str = "date";
    pub const NUMERIC: &str = "numeric";
    pub const CATEGORY: &str = "category";
}

/// One entry of the structure manifest: a column name and its declared kind.
///
/// The manifest serializes the kind under the field name `type`
/// (`[{"name": "Date", "type": "date"}, ...]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ColumnDescriptor {
    /// Create a descriptor from a name and kind
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Classified column partitions.
///
/// `date` holds the time dimension: the first column declared `"date"`.
/// Later date declarations are ignored. Columns with unrecognized kinds are
/// excluded from every partition and participate in no chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Columns {
    /// The time dimension, when the structure declares a date column
    pub date: Option<String>,
    /// Numeric measures, in declaration order
    pub numeric: Vec<String>,
    /// Categorical dimensions, in declaration order
    pub categorical: Vec<String>,
}

impl Columns {
    /// Partition a structure manifest by declared kind.
    ///
    /// Matching is exact and case-sensitive against the strings in [`kind`].
    pub fn classify(structure: &[ColumnDescriptor]) -> Self {
        let mut columns = Columns::default();
        for descriptor in structure {
            match descriptor.kind.as_str() {
                kind::DATE => {
                    if columns.date.is_none() {
                        columns.date = Some(descriptor.name.clone());
                    }
                }
                kind::NUMERIC => columns.numeric.push(descriptor.name.clone()),
                kind::CATEGORY => columns.categorical.push(descriptor.name.clone()),
                _ => {}
            }
        }
        columns
    }

    /// Check if no column landed in any partition
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.numeric.is_empty() && self.categorical.is_empty()
    }
}
