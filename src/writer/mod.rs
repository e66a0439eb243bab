//! Output writer abstraction layer for chartdeck
//!
//! The writer module provides a pluggable interface for turning chart
//! descriptors plus aggregated data into renderer payloads.
//!
//! # Architecture
//!
//! All writers implement the `Writer` trait, which provides:
//! - Descriptor + aggregate → payload conversion
//! - Validation that an aggregate shape fits a descriptor kind
//! - Format-specific payload layout
//!
//! # Example
//!
//! ```rust,ignore
//! use chartdeck::writer::{Nvd3Writer, Writer};
//!
//! let writer = Nvd3Writer::new();
//! let json = writer.write(&spec, &data)?;
//! println!("{}", json);
//! ```

use crate::api::ChartData;
use crate::manifest::ChartSpec;
use crate::Result;

pub mod nvd3;

pub use nvd3::Nvd3Writer;

/// Trait for chart payload writers
///
/// Writers take a chart descriptor and its aggregate and produce formatted
/// output (JSON for a charting library, text, etc.).
pub trait Writer {
    /// Generate a payload from a chart descriptor and its aggregate
    ///
    /// # Arguments
    ///
    /// * `spec` - The chart descriptor being rendered
    /// * `data` - The aggregate computed for it
    ///
    /// # Returns
    ///
    /// A string containing the formatted payload
    ///
    /// # Errors
    ///
    /// Returns `DeckError::WriterError` if:
    /// - The aggregate shape does not fit the descriptor kind
    /// - Payload generation fails
    fn write(&self, spec: &ChartSpec, data: &ChartData) -> Result<String>;

    /// Validate that an aggregate shape fits a descriptor kind
    ///
    /// Checks compatibility without generating output.
    ///
    /// # Errors
    ///
    /// Returns `DeckError::WriterError` on a shape mismatch.
    fn validate(&self, spec: &ChartSpec, data: &ChartData) -> Result<()>;
}
