//! Error types for the supply-chain analytics pipeline.
//!
//! The hierarchy mirrors the pipeline stages:
//!
//! - [`SourceError`] - loading and parsing the source table
//! - [`AnalyticsError`] - degenerate input detected by an aggregation stage
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP collaborator errors
//!
//! Every [`PipelineError`] maps onto one [`ErrorKind`], the three-way taxonomy
//! callers branch on (absent source, malformed source, degenerate input).

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading the source table into a [`crate::Dataset`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source file does not exist.
    #[error("Data file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Failed to read file.
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the raw bytes.
    #[error("Failed to decode source: {0}")]
    Encoding(String),

    /// No header line.
    #[error("Source file is empty")]
    Empty,

    /// A required column is absent from the header.
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    /// A cell could not be parsed into the column's type.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        message: String,
    },

    /// Structural CSV error (unterminated quote, bad record).
    #[error("Line {line}: {message}")]
    Csv { line: usize, message: String },
}

// =============================================================================
// Analytics Errors
// =============================================================================

/// Structurally valid input that makes a metric undefined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Means over zero rows.
    #[error("Dataset has no rows; {stage} is undefined")]
    EmptyDataset { stage: &'static str },

    /// Cumulative share divides by total units sold.
    #[error("Total units sold is zero; ABC classification is undefined")]
    ZeroUnitsSold,

    /// A count column sums past `u64::MAX`.
    #[error("Sum of '{column}' overflows")]
    Overflow { column: &'static str },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline error, returned by [`crate::build_dashboard`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// An aggregation stage rejected the dataset.
    #[error("Degenerate input: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// Failure taxonomy exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceNotFound,
    MalformedSource,
    DegenerateInput,
}

impl PipelineError {
    /// Classify this error into the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Source(SourceError::NotFound { .. }) => ErrorKind::SourceNotFound,
            PipelineError::Source(_) => ErrorKind::MalformedSource,
            PipelineError::Analytics(_) => ErrorKind::DegenerateInput,
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for aggregation stages.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let err: PipelineError = SourceError::Empty.into();
        assert!(err.to_string().contains("empty"));
        assert_eq!(err.kind(), ErrorKind::MalformedSource);

        let err: PipelineError = AnalyticsError::ZeroUnitsSold.into();
        assert!(err.to_string().contains("units sold"));
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);

        let err: PipelineError = AnalyticsError::Overflow {
            column: "Stock levels",
        }
        .into();
        assert!(err.to_string().contains("'Stock levels' overflows"));
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);
    }

    #[test]
    fn test_not_found_is_distinct() {
        let err: PipelineError = SourceError::NotFound {
            path: PathBuf::from("data/missing.csv"),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_invalid_value_format() {
        let err = SourceError::InvalidValue {
            line: 5,
            column: "Price".into(),
            value: "abc".into(),
            message: "expected a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 5"));
        assert!(msg.contains("column 'Price'"));
        assert!(msg.contains("value 'abc'"));
    }
}
