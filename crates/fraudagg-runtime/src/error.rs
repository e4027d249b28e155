//! Runtime error types

use fraudagg_core::CoreError;
use thiserror::Error;

/// Runtime error
///
/// Every failure is reported synchronously and no partial table is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Required column missing or carrying the wrong semantic type
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid or empty aggregation configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A grouping key mapped to zero rows
    #[error("Empty partition for grouping key {0}")]
    EmptyPartitionError(String),
}

impl From<CoreError> for RuntimeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => RuntimeError::ConfigError(msg),
            other => RuntimeError::SchemaError(other.to_string()),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let err: RuntimeError = CoreError::FieldNotFound("tx_amount".to_string()).into();
        assert!(matches!(err, RuntimeError::SchemaError(ref msg) if msg.contains("tx_amount")));

        let err: RuntimeError = CoreError::Config("empty windows".to_string()).into();
        assert_eq!(err, RuntimeError::ConfigError("empty windows".to_string()));
    }

    #[test]
    fn test_error_display() {
        let err = RuntimeError::EmptyPartitionError("customer_id=7".to_string());
        assert_eq!(err.to_string(), "Empty partition for grouping key customer_id=7");
    }
}
