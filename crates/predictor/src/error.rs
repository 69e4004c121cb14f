use recsys_core::RecsysError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PredictError>;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Cannot open file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Cannot average an empty {0}")]
    EmptyMatrix(&'static str),

    #[error("RMSE size not equal: predicted {predicted} entries, actual {actual}")]
    SizeMismatch { predicted: usize, actual: usize },

    #[error("RMSE row or col not equal at entry {index}: predicted {predicted:?}, actual {actual:?}")]
    KeyMismatch {
        index: usize,
        predicted: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid flags: {0}")]
    InvalidFlags(String),

    #[error("No prediction for user {row} item {col}")]
    MissingPrediction { row: usize, col: usize },

    #[error(transparent)]
    Config(#[from] RecsysError),

    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl PredictError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PredictError::Io {
            path: path.into(),
            source,
        }
    }
}
