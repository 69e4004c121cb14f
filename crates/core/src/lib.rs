//! # Recsys Core
//!
//! Shared building blocks for the recsys workspace.
//!
//! ## Modules
//!
//! - `error`: Error types and handling
//! - `config`: Configuration loading and validation
//! - `observability`: Structured logging initialization

pub mod config;
pub mod error;
pub mod observability;

// Re-export commonly used types
pub use config::{load_dotenv, parse_env_var, ConfigLoader, LoggingConfig};
pub use error::{RecsysError, Result};
pub use observability::{init_logging, LogConfig, LogFormat};
