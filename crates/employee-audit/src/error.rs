//! Custom error types for the employee audit pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Only fatal
//! conditions live here: unreadable input, unusable configuration and
//! output failures. Malformed cells and rule violations are data, not
//! errors, and travel inside the report instead.
//!
//! Errors are serializable so they can be emitted as part of a JSON run
//! summary.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Input CSV file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Required columns are absent and strict column checking is enabled.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Configuration rejected while loading or building.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Statistical analysis of the cleaned records failed.
    #[error("Failed to analyze dataset: {0}")]
    AnalysisFailed(String),

    /// A chart could not be drawn or written.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRenderFailed { chart: String, reason: String },

    /// Report could not be written.
    #[error("Failed to write report: {0}")]
    ReportWriteFailed(String),

    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or frame manipulation failed.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Config or report (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another error with a description of what was being done.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AuditError>,
    },
}

impl AuditError {
    /// Wrap this error with a description of the failing step.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AuditError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputNotFound(_) => "INPUT_NOT_FOUND",
            Self::MissingColumns(_) => "MISSING_COLUMNS",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::AnalysisFailed(_) => "ANALYSIS_FAILED",
            Self::ChartRenderFailed { .. } => "CHART_RENDER_FAILED",
            Self::ReportWriteFailed(_) => "REPORT_WRITE_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is caused by the input data rather than the environment.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::InputNotFound(_) | Self::MissingColumns(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AuditError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AuditError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Adds [`AuditError::with_context`] to results.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with `context`.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Io(e).with_context(context))
    }
}
