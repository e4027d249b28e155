//! Error types for FRAUDAGG Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Column length mismatch for '{column}': expected {expected} rows, got {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
