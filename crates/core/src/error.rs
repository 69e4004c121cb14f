//! Shared error type for the recsys workspace

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecsysError>;

#[derive(Debug, Error)]
pub enum RecsysError {
    /// Configuration could not be parsed or failed validation
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        /// Environment variable the error refers to, if any
        key: Option<String>,
    },

    #[error("Observability error: {0}")]
    ObservabilityError(String),
}

impl RecsysError {
    pub fn config(message: impl Into<String>, key: &str) -> Self {
        RecsysError::ConfigurationError {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}
