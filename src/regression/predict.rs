//! Prediction queries against a fitted model
//!
//! Point estimates plus prediction intervals that account for both the
//! variance of the estimated mean response and the irreducible residual
//! noise.

use crate::error::PredictionError;
use crate::regression::distribution::student_t_quantile;
use crate::regression::ols::FittedModel;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Default confidence level for prediction intervals
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// A single feature vector supplied at request time. Values must follow the
/// model's canonical feature order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionQuery {
    values: Vec<f64>,
}

impl PredictionQuery {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Convenience constructor in the canonical wine feature order
    pub fn from_features(
        alcohol: f64,
        volatile_acidity: f64,
        sulphates: f64,
        citric_acid: f64,
        density: f64,
    ) -> Self {
        Self {
            values: vec![alcohol, volatile_acidity, sulphates, citric_acid, density],
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Point estimate with a two-sided prediction interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence: f64,
    /// Standard error of an individual predicted response
    pub std_error: f64,
}

impl PredictionResult {
    /// Width of the interval, upper − lower
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Answer a prediction query at the given confidence level.
///
/// The interval is a prediction interval for an individual response:
/// se_pred = s·sqrt(1 + x₀ᵀ(XᵀX)⁻¹x₀) where x₀ is the query augmented with
/// the intercept term. Pure with respect to the model.
pub fn predict(
    model: &FittedModel,
    query: &PredictionQuery,
    confidence: f64,
) -> Result<PredictionResult, PredictionError> {
    let p = model.coefficients().len();
    if query.values().len() != p {
        return Err(PredictionError::ShapeMismatch {
            expected: p,
            actual: query.values().len(),
        });
    }
    if let Some(pos) = query.values().iter().position(|v| !v.is_finite()) {
        return Err(PredictionError::NonFiniteInput(pos));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(PredictionError::InvalidConfidence(confidence));
    }

    let mut x0 = Array1::ones(p + 1);
    for (j, &v) in query.values().iter().enumerate() {
        x0[j + 1] = v;
    }

    let estimate = model.intercept()
        + model
            .coefficients()
            .iter()
            .zip(query.values())
            .map(|(c, v)| c * v)
            .sum::<f64>();

    // Quadratic form x₀ᵀ(XᵀX)⁻¹x₀ captures the model uncertainty at x₀;
    // the leading 1 is the irreducible residual noise
    let leverage = x0.dot(&model.xtx_inv().dot(&x0));
    let std_error = model.residual_std_error() * (1.0 + leverage.max(0.0)).sqrt();

    let tail = 0.5 * (1.0 + confidence);
    let t_crit = student_t_quantile(tail, model.residual_df() as f64);
    let half_width = t_crit * std_error;

    Ok(PredictionResult {
        estimate,
        lower: estimate - half_width,
        upper: estimate + half_width,
        confidence,
        std_error,
    })
}

impl FittedModel {
    /// Method form of [`predict`] with the default 95% confidence level
    pub fn predict(&self, query: &PredictionQuery) -> Result<PredictionResult, PredictionError> {
        predict(self, query, DEFAULT_CONFIDENCE)
    }

    /// Method form of [`predict`] at an explicit confidence level
    pub fn predict_with_confidence(
        &self,
        query: &PredictionQuery,
        confidence: f64,
    ) -> Result<PredictionResult, PredictionError> {
        predict(self, query, confidence)
    }
}
