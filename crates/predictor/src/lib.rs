//! Neighborhood Rating Predictor
//!
//! Predicts missing user-item ratings from a sparse ratings matrix. Each user's
//! most similar users (Pearson correlation, top-K) vote with bias-corrected
//! ratings; when too few of them rated an item, items sharing its attributes
//! are averaged instead.

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod pipeline;
pub mod predict;
pub mod progress;
pub mod similarity;
pub mod sparse_matrix;
pub mod split;
pub mod stats;

// Re-export key types
pub use config::PredictorConfig;
pub use dataset::{
    read_item_attribute, read_test_dataset, read_train_dataset, write_dataset,
    write_dataset_in_order,
};
pub use error::{PredictError, Result};
pub use evaluation::rmse;
pub use pipeline::{run, RunOptions, RunSummary};
pub use predict::{
    predict, predict_with_config, AttributeIndex, FeatureFlags, Predictor, RATING_MAX, RATING_MIN,
};
pub use similarity::{build_neighbor_map, pearson, Neighbor, NeighborMap, TopK};
pub use sparse_matrix::{AttributeMatrix, Entry, RatingMatrix, SparseMatrix};
pub use split::make_train_test;
pub use stats::{global_average, RowAverages, Statistics};
