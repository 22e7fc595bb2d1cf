//! Regression engine: OLS fit, prediction with intervals, model summary

pub mod distribution;
pub mod ols;
pub mod predict;
pub mod summary;

pub use ols::{fit, FittedModel};
pub use predict::{predict, PredictionQuery, PredictionResult, DEFAULT_CONFIDENCE};
pub use summary::{CoefficientSummary, ModelSummary};
