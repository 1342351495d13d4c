//! Custom error types for the HR analysis pipeline.
//!
//! This module provides a comprehensive error hierarchy using `thiserror`
//! for better error handling and context throughout the pipeline.
//!
//! Errors are serializable so skip diagnostics can be embedded in the
//! machine-readable run report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    /// Performance label outside the fixed ordinal vocabulary.
    #[error("Performance label '{label}' is outside the known vocabulary ({occurrences} occurrences)")]
    UnmappableLabel { label: String, occurrences: usize },

    /// Not enough observations, groups, or variance for a statistical test.
    #[error("Insufficient data for {analysis}: {reason}")]
    InsufficientData { analysis: String, reason: String },

    /// Hire date value could not be parsed.
    #[error("Unparseable date '{value}' in column '{column}'")]
    DateParse { column: String, value: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable machine-readable error code.
    ///
    /// These codes let report consumers handle specific error classes
    /// differently (e.g., a skipped test vs. an unreadable input file).
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::UnmappableLabel { .. } => "UNMAPPABLE_LABEL",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::DateParse { .. } => "DATE_PARSE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is recoverable within a run.
    ///
    /// Recoverable errors skip the affected analysis (or record) with a
    /// diagnostic; the rest of the pipeline continues. Infrastructure
    /// failures are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingColumn(_)
            | Self::UnmappableLabel { .. }
            | Self::InsufficientData { .. }
            | Self::DateParse { .. } => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields,
/// making them easy to embed in the JSON run report.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}
