//! Error types for laboratory data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run at the input boundary.
///
/// Row numbers are 1-based data rows (the header is not counted).
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has a header but no data rows.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Required column not present in the header.
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    // === Row Validation Errors ===
    /// A cell could not be interpreted.
    #[error("row {row}: invalid {column} value '{value}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub(crate) fn invalid(
        row: usize,
        column: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::invalid(4, "lab_date", "2024-13-01", "not a calendar date");
        assert_eq!(
            err.to_string(),
            "row 4: invalid lab_date value '2024-13-01': not a calendar date"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
