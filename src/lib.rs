//! winereg - Wine quality regression engine
//!
//! Fits a multiple linear regression of wine quality on five chemical
//! features and answers prediction queries with statistically computed
//! prediction intervals.
//!
//! # Modules
//!
//! - [`data`] - Dataset loading and column selection
//! - [`regression`] - OLS fit, prediction, coefficient inference, summary
//! - [`cache`] - Session-scoped memoization of load and fit results
//! - [`cli`] - Command-line presentation layer
//!
//! # Example
//!
//! ```no_run
//! use winereg::prelude::*;
//!
//! # fn main() -> winereg::error::Result<()> {
//! let dataset = winereg::data::load("winequality-red.csv")?;
//! let model = winereg::regression::fit(&dataset)?;
//! let query = PredictionQuery::from_features(10.0, 0.5, 0.65, 0.25, 0.995);
//! let result = model.predict(&query)?;
//! println!("{:.2} ({:.2} – {:.2})", result.estimate, result.lower, result.upper);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Data loading
pub mod data;

// Regression engine
pub mod regression;

// Memoization
pub mod cache;

// Presentation
pub mod cli;

pub use error::{DataLoadError, FitError, PredictionError, Result, WineRegError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::SessionCache;
    pub use crate::data::{load, Dataset, FEATURE_COLUMNS, TARGET_COLUMN};
    pub use crate::error::{DataLoadError, FitError, PredictionError, Result, WineRegError};
    pub use crate::regression::{
        fit, predict, FittedModel, ModelSummary, PredictionQuery, PredictionResult,
        DEFAULT_CONFIDENCE,
    };
}
