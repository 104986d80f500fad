//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration and manifest errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("TOML parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Join collected validation messages into one error.
    pub(crate) fn from_messages(messages: Vec<String>) -> Result<(), Self> {
        if messages.is_empty() {
            return Ok(());
        }
        Err(Self::Validation(messages.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("sitegraph.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("sitegraph.toml"));

        let validation_err = ConfigError::Validation("debounce_ms must be > 0".to_string());
        assert!(format!("{validation_err}").contains("debounce_ms"));
    }

    #[test]
    fn test_from_messages() {
        assert!(ConfigError::from_messages(Vec::new()).is_ok());

        let err = ConfigError::from_messages(vec!["a".into(), "b".into()]).unwrap_err();
        assert_eq!(err.to_string(), "config validation error: a; b");
    }
}
