//! End-to-end run: load, train, predict, evaluate, write

use crate::config::PredictorConfig;
use crate::dataset::{
    read_item_attribute, read_test_dataset, read_train_dataset, write_dataset,
    write_dataset_in_order,
};
use crate::error::{PredictError, Result};
use crate::evaluation::rmse;
use crate::predict::{predict_with_config, FeatureFlags};
use crate::sparse_matrix::AttributeMatrix;
use crate::split::make_train_test;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// What to read, where to write, and how to predict
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ratings file
    pub train: PathBuf,
    /// Query file; ignored in offline mode
    pub test: Option<PathBuf>,
    /// Item attribute file, required with `use_attribute`
    pub attributes: Option<PathBuf>,
    pub result: PathBuf,
    /// Hold out part of `train` and report RMSE instead of answering `test`
    pub offline: bool,
    pub flags: FeatureFlags,
    /// Optional JSON run report
    pub report: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub offline: bool,
    pub train_entries: usize,
    pub predictions: usize,
    /// Only set in offline mode
    pub rmse: Option<f64>,
    pub elapsed_secs: f64,
    pub flags: FeatureFlags,
    pub config: PredictorConfig,
}

impl RunOptions {
    /// Reject inconsistent options before any file is read
    pub fn validate(&self) -> Result<()> {
        if self.flags.use_attribute() && self.attributes.is_none() {
            return Err(PredictError::InvalidFlags(
                "use-attribute requires an attribute file".to_string(),
            ));
        }
        if !self.offline && self.test.is_none() {
            return Err(PredictError::InvalidFlags(
                "a test file is required unless running offline".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn run(options: &RunOptions, config: &PredictorConfig) -> Result<RunSummary> {
    options.validate()?;
    let started = Instant::now();

    let attributes = match (&options.attributes, options.flags.use_attribute()) {
        (Some(path), true) => read_item_attribute(path)?,
        _ => AttributeMatrix::empty(),
    };
    let ratings = read_train_dataset(&options.train)?;

    let summary = match (&options.test, options.offline) {
        (_, true) => {
            let (train, test) = make_train_test(&ratings, config.test_count, config.split_seed);
            let result = predict_with_config(&train, &test, &attributes, options.flags, config)?;
            let score = rmse(&result, &test)?;
            info!(rmse = score, entries = test.len(), "Offline evaluation");

            write_dataset(&options.result, &result)?;
            RunSummary {
                offline: true,
                train_entries: train.len(),
                predictions: result.len(),
                rmse: Some(score),
                elapsed_secs: started.elapsed().as_secs_f64(),
                flags: options.flags,
                config: config.clone(),
            }
        }
        (Some(test_path), false) => {
            let query = read_test_dataset(test_path)?;
            let result = predict_with_config(&ratings, &query, &attributes, options.flags, config)?;

            write_dataset_in_order(test_path, &options.result, &result)?;
            RunSummary {
                offline: false,
                train_entries: ratings.len(),
                predictions: result.len(),
                rmse: None,
                elapsed_secs: started.elapsed().as_secs_f64(),
                flags: options.flags,
                config: config.clone(),
            }
        }
        (None, false) => unreachable!("validated above"),
    };

    if let Some(report) = &options.report {
        let file = File::create(report).map_err(|e| PredictError::io(report, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &summary)?;
        writer.flush().map_err(|e| PredictError::io(report, e))?;
        info!(path = %report.display(), "Wrote run report");
    }

    info!(
        predictions = summary.predictions,
        elapsed_secs = summary.elapsed_secs,
        "Run finished"
    );
    Ok(summary)
}
