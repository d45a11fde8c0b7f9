//! Error types for the gradecast crate

use thiserror::Error;

/// Result type alias for gradecast operations
pub type Result<T> = std::result::Result<T, GradecastError>;

/// Main error type for the gradecast crate
#[derive(Error, Debug)]
pub enum GradecastError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Artifact integrity violation: {0}")]
    ArtifactIntegrity(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<polars::error::PolarsError> for GradecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        GradecastError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for GradecastError {
    fn from(err: serde_json::Error) -> Self {
        GradecastError::Serialization(err.to_string())
    }
}
