//! Error types for data operations.

use crate::columns::CanonicalField;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or normalizing a dataset.
///
/// These are dataset-level failures. Problems confined to a single row are
/// reported through [`crate::normalize::RowParseFailure`] instead.
#[derive(Debug, Error)]
pub enum DataError {
    /// One or more required fields could not be resolved to a source column
    #[error("Missing required column(s): {}", format_fields(.fields))]
    MissingRequiredColumn {
        /// Required fields that have no usable source column
        fields: Vec<CanonicalField>,
    },

    /// A row has a different number of cells than the header
    #[error("Row {row} has {actual} cells, header has {expected}")]
    RaggedRow {
        /// Zero-based row index
        row: usize,
        /// Number of header columns
        expected: usize,
        /// Number of cells in the row
        actual: usize,
    },

    /// A required field is bound to a header that appears more than once
    #[error("Column header {header:?} for {field} appears more than once")]
    AmbiguousColumn {
        /// Field bound to the header
        field: CanonicalField,
        /// The repeated header
        header: String,
    },

    /// Unknown canonical field name
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Unknown column preset
    #[error("Unknown column preset: {0}")]
    UnknownPreset(String),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
