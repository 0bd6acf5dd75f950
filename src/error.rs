//! Error types for the solutions matrix

use thiserror::Error;

/// Errors that can occur while loading or building the matrix
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Failed to load dataset: {0}")]
    LoadFailure(String),

    #[error("Dataset loaded but contains no rows")]
    EmptyDataset,

    #[error("Dataset loaded but contains no rows with a project identifier")]
    NoDataRows,

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
