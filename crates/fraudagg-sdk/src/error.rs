//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] fraudagg_runtime::RuntimeError),

    /// YAML configuration could not be parsed
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<fraudagg_core::CoreError> for SdkError {
    fn from(err: fraudagg_core::CoreError) -> Self {
        SdkError::RuntimeError(err.into())
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fraudagg_core::CoreError;
    use fraudagg_runtime::RuntimeError;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("Invalid configuration".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_runtime_error_conversion() {
        let error: SdkError = RuntimeError::SchemaError("tx_amount".to_string()).into();
        assert_eq!(error.to_string(), "Runtime error: Schema error: tx_amount");
    }

    #[test]
    fn test_core_error_conversion() {
        let error: SdkError = CoreError::Config("no windows".to_string()).into();
        assert!(matches!(
            error,
            SdkError::RuntimeError(RuntimeError::ConfigError(_))
        ));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<Vec<u32>>("[1, two").unwrap_err();
        let sdk_error: SdkError = yaml_error.into();
        assert!(sdk_error.to_string().starts_with("YAML error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }

    #[test]
    fn test_error_debug_format() {
        let error = SdkError::ConfigError("test".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("ConfigError"));
    }
}
