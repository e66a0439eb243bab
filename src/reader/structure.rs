//! Structure manifest file source
//!
//! Reads the column structure manifest from a JSON file: an ordered array of
//! `{"name": ..., "type": ...}` descriptors, as produced by offline dataset
//! analysis.

use super::StructureSource;
use crate::schema::ColumnDescriptor;
use crate::{DeckError, Result};
use std::path::{Path, PathBuf};

/// Structure source over a JSON descriptor file
pub struct StructureFile {
    path: PathBuf,
}

impl StructureFile {
    /// Point at a structure manifest file; reading happens on demand
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the source reads from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StructureSource for StructureFile {
    fn structure(&self) -> Result<Vec<ColumnDescriptor>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            DeckError::SourceError(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let descriptors: Vec<ColumnDescriptor> = serde_json::from_str(&text).map_err(|e| {
            DeckError::StructureError(format!(
                "Invalid structure manifest {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(descriptors)
    }
}
