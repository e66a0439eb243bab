//! CSV file row source
//!
//! Loads a CSV file through Polars and serves it via the shared DataFrame
//! adapter. Date-looking columns are parsed at load time so they arrive as
//! typed dates rather than text.

use super::dataframe::DataFrameSource;
use super::RowSource;
use crate::value::Row;
use crate::{DeckError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Row source over a CSV file, loaded eagerly at open time
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    source: DataFrameSource,
}

impl CsvSource {
    /// Open and fully read a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::SourceError` if the file cannot be opened or
    /// parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(path.clone()))
            .map_err(|e| {
                DeckError::SourceError(format!("Failed to open {}: {}", path.display(), e))
            })?
            .finish()
            .map_err(|e| {
                DeckError::SourceError(format!("Failed to read {}: {}", path.display(), e))
            })?;
        Ok(Self {
            path,
            source: DataFrameSource::new(frame),
        })
    }

    /// Path the source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows in the file
    pub fn height(&self) -> usize {
        self.source.height()
    }
}

impl RowSource for CsvSource {
    fn column_names(&self) -> Result<Vec<String>> {
        self.source.column_names()
    }

    fn rows(&self) -> Result<Vec<Row>> {
        self.source.rows()
    }
}
