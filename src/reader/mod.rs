//! Data acquisition layer for chartdeck
//!
//! The reader module turns external tabular inputs into the row snapshot the
//! aggregation engine works on. Acquisition is the only stage that touches
//! the filesystem; everything downstream operates on the immutable rows and
//! structure produced here.
//!
//! # Architecture
//!
//! Two small traits split acquisition along its natural seam:
//! - `RowSource` yields column names and raw rows (CSV files, in-memory
//!   DataFrames)
//! - `StructureSource` yields the column structure manifest (a JSON file, or
//!   inference over a row sample via `schema::infer_structure`)
//!
//! # Example
//!
//! ```rust,ignore
//! use chartdeck::reader::{CsvSource, RowSource};
//!
//! let source = CsvSource::open("campaign.csv")?;
//! let rows = source.rows()?;
//! ```

use crate::schema::ColumnDescriptor;
use crate::value::Row;
use crate::Result;

pub mod csv;
pub mod dataframe;
pub mod structure;

pub use csv::CsvSource;
pub use dataframe::DataFrameSource;
pub use structure::StructureFile;

/// Trait for tabular row sources
///
/// Sources yield the dataset as owned rows of raw values. They provide a
/// uniform interface for file-backed and in-memory inputs.
pub trait RowSource {
    /// Column names in source order
    ///
    /// # Errors
    ///
    /// Returns `DeckError::SourceError` if the source cannot be read.
    fn column_names(&self) -> Result<Vec<String>>;

    /// Materialize every row of the source
    ///
    /// Cell values arrive as [`crate::value::RawValue`]: numbers stay
    /// numeric, dates stay dates, everything else is text or null. No
    /// coercion happens here.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::SourceError` if the source cannot be read or a
    /// cell cannot be extracted.
    fn rows(&self) -> Result<Vec<Row>>;
}

/// Trait for structure manifest sources
///
/// A structure manifest is the ordered list of column descriptors that
/// drives classification and the chart manifest.
pub trait StructureSource {
    /// Produce the ordered column descriptors
    ///
    /// # Errors
    ///
    /// Returns `DeckError::SourceError` if the source cannot be read, or
    /// `DeckError::StructureError` if its content is malformed.
    fn structure(&self) -> Result<Vec<ColumnDescriptor>>;
}
