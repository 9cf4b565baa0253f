//! Error types for dump-to-Parquet conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the conversion library.
///
/// Alignment overshoots are deliberately absent: a column chunk or row group
/// exceeding its padded budget means the configuration cannot meet the
/// alignment contract, and the writer panics instead of returning.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The Parquet encoder rejected an operation.
    #[error("parquet encoding error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Configuration that can never produce aligned output.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A particle dump that cannot be decoded.
    #[error("malformed particle dump {path}: {reason}")]
    BadInput { path: PathBuf, reason: String },

    /// The conversion worker pool could not be constructed.
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

impl ConvertError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn bad_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BadInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
