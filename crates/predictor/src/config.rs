//! Predictor configuration
//!
//! # Environment Variables
//!
//! - `RECSYS_NEIGHBORS` (optional): Neighbors kept per user (default: 5000)
//! - `RECSYS_TEST_COUNT` (optional): Ratings held out per user in offline mode (default: 3)
//! - `RECSYS_SPLIT_SEED` (optional): Seed of the offline train/test split (default: 42)
//! - `RECSYS_TRAIN_PROGRESS_INTERVAL` (optional): User pairs between progress events (default: 1000000)
//! - `RECSYS_PREDICT_PROGRESS_INTERVAL` (optional): Queries between progress events (default: 100)

use recsys_core::{parse_env_var, ConfigLoader, RecsysError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorConfig {
    /// Neighbors kept per user (K)
    pub neighbors: usize,
    /// Ratings held out per user when splitting
    pub test_count: usize,
    pub split_seed: u64,
    pub train_progress_interval: usize,
    pub predict_progress_interval: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            neighbors: 5000,
            test_count: 3,
            split_seed: 42,
            train_progress_interval: 1_000_000,
            predict_progress_interval: 100,
        }
    }
}

impl ConfigLoader for PredictorConfig {
    fn from_env() -> Result<Self> {
        let defaults = PredictorConfig::default();

        Ok(Self {
            neighbors: parse_env_var("RECSYS_NEIGHBORS", defaults.neighbors)?,
            test_count: parse_env_var("RECSYS_TEST_COUNT", defaults.test_count)?,
            split_seed: parse_env_var("RECSYS_SPLIT_SEED", defaults.split_seed)?,
            train_progress_interval: parse_env_var(
                "RECSYS_TRAIN_PROGRESS_INTERVAL",
                defaults.train_progress_interval,
            )?,
            predict_progress_interval: parse_env_var(
                "RECSYS_PREDICT_PROGRESS_INTERVAL",
                defaults.predict_progress_interval,
            )?,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.neighbors == 0 {
            return Err(RecsysError::config(
                "neighbors must be greater than 0",
                "RECSYS_NEIGHBORS",
            ));
        }

        if self.train_progress_interval == 0 {
            return Err(RecsysError::config(
                "train_progress_interval must be greater than 0",
                "RECSYS_TRAIN_PROGRESS_INTERVAL",
            ));
        }

        if self.predict_progress_interval == 0 {
            return Err(RecsysError::config(
                "predict_progress_interval must be greater than 0",
                "RECSYS_PREDICT_PROGRESS_INTERVAL",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_predictor_config_default() {
        let config = PredictorConfig::default();
        assert_eq!(config.neighbors, 5000);
        assert_eq!(config.test_count, 3);
        assert_eq!(config.split_seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_predictor_config_from_env() {
        env::set_var("RECSYS_NEIGHBORS", "250");
        env::set_var("RECSYS_TEST_COUNT", "5");

        let config = PredictorConfig::from_env().unwrap();
        assert_eq!(config.neighbors, 250);
        assert_eq!(config.test_count, 5);

        env::remove_var("RECSYS_NEIGHBORS");
        env::remove_var("RECSYS_TEST_COUNT");
    }

    #[test]
    fn test_predictor_config_validation_zero_neighbors() {
        let config = PredictorConfig {
            neighbors: 0,
            ..Default::default()
        };

        match config.validate().unwrap_err() {
            RecsysError::ConfigurationError { key, .. } => {
                assert_eq!(key.as_deref(), Some("RECSYS_NEIGHBORS"));
            }
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_predictor_config_validation_zero_interval() {
        let config = PredictorConfig {
            predict_progress_interval: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
