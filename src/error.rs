//! Error types for tree construction and classification.

use thiserror::Error;

/// Errors raised while building or querying a weather-type tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Malformed breakpoints at row {row}: {reason}")]
    MalformedBreakpoints { row: usize, reason: String },

    #[error("Intervals for {predictor} do not tile [{low}, {high}): {reason}")]
    RangeMismatch {
        predictor: String,
        low: f64,
        high: f64,
        reason: String,
    },

    #[error("Value {value} of {predictor} falls outside every interval below node {code}")]
    ValueOutOfRange {
        predictor: String,
        value: f64,
        code: String,
    },

    #[error("No value supplied for predictor {predictor}")]
    MissingPredictor { predictor: String },

    #[error("Predictor {predictor} splits into {count} branches, at most 9 fit in a code digit")]
    TooManyBranches { predictor: String, count: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        TreeError::MalformedBreakpoints {
            row,
            reason: reason.into(),
        }
    }

    /// Query errors concern a single observation; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TreeError::ValueOutOfRange { .. } | TreeError::MissingPredictor { .. }
        )
    }
}

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
