//! Shared configuration loader module for recsys binaries
//!
//! This module provides a unified configuration loading system with environment variable
//! parsing, validation, and support for .env files. All configuration uses the
//! `RECSYS_` prefix for environment variables.
//!
//! Override hierarchy: defaults < .env < environment < command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use recsys_core::config::{load_dotenv, ConfigLoader, LoggingConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! load_dotenv();
//!
//! let logging = LoggingConfig::from_env()?;
//! logging.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{RecsysError, Result};
use crate::observability::LogFormat;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if an environment variable value cannot be parsed.
    fn from_env() -> Result<Self>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<()>;
}

/// Logging configuration
///
/// # Environment Variables
///
/// - `RECSYS_LOG_LEVEL` (optional): Log filter directive, falls back to `RUST_LOG` (default: "info")
/// - `RECSYS_LOG_FORMAT` (optional): `pretty` or `json` (default: "pretty")
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl ConfigLoader for LoggingConfig {
    fn from_env() -> Result<Self> {
        let level = std::env::var("RECSYS_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| LoggingConfig::default().level);

        let format = parse_env_var("RECSYS_LOG_FORMAT", LoggingConfig::default().format)?;

        Ok(Self { level, format })
    }

    fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        let level = self.level.to_lowercase();

        // Filter directives such as "recsys_predictor=debug" are passed through as-is
        if !level.contains('=') && !valid_log_levels.contains(&level.as_str()) {
            return Err(RecsysError::config(
                format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.level,
                    valid_log_levels.join(", ")
                ),
                "RECSYS_LOG_LEVEL",
            ));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable with default value
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is set but cannot be parsed
pub fn parse_env_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| RecsysError::config(format!("Failed to parse {}: {}", key, e), key))
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Does not return an error if the .env file is not found.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
