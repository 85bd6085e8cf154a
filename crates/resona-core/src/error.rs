//! Error types for Resona.

use thiserror::Error;

/// Main error type for Resona operations.
#[derive(Error, Debug)]
pub enum ResonaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Selection too short: {got} samples (need at least {need})")]
    SelectionTooShort { got: usize, need: usize },

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Resona operations.
pub type Result<T> = std::result::Result<T, ResonaError>;
