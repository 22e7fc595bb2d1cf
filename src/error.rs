//! Error types for the wine quality regression engine

use thiserror::Error;

/// Result type alias for operations that may fail anywhere in the pipeline
pub type Result<T> = std::result::Result<T, WineRegError>;

/// Umbrella error for the full load-fit-predict pipeline
#[derive(Error, Debug)]
pub enum WineRegError {
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Errors raised while reading the tabular source file
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Required column not found: {0}")]
    MissingColumn(String),

    #[error("Unparseable value in column '{column}' at row {row}")]
    UnparseableValue { column: String, row: usize },

    #[error("Dataset is empty: {0}")]
    Empty(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

/// Errors raised while fitting the OLS model
#[derive(Error, Debug)]
pub enum FitError {
    #[error("Insufficient data: {n_obs} observations for {n_features} features (need at least {min})")]
    InsufficientData {
        n_obs: usize,
        n_features: usize,
        min: usize,
    },

    #[error("Design matrix is rank-deficient, features are perfectly collinear")]
    RankDeficient,

    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

/// Errors raised while answering a prediction query
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Query has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Query contains a non-finite value at position {0}")]
    NonFiniteInput(usize),

    #[error("Confidence level must be strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),
}
