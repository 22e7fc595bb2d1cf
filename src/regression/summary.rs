//! Model summary for the presentation layer
//!
//! Mirrors the summary block a UI renders: R², the coefficient table, and
//! which variables clear a significance threshold.

use crate::regression::ols::FittedModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the coefficient table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoefficientSummary {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_stat: f64,
    pub p_value: f64,
}

/// Read-only summary of a fitted model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub n_obs: usize,
    pub r_squared: f64,
    pub residual_std_error: f64,
    pub residual_df: usize,
    /// Intercept first, then one row per feature in canonical order
    pub coefficients: Vec<CoefficientSummary>,
}

impl ModelSummary {
    /// Feature names with p-value below `alpha`, intercept excluded
    pub fn significant_features(&self, alpha: f64) -> Vec<&str> {
        self.coefficients
            .iter()
            .skip(1)
            .filter(|c| c.p_value < alpha)
            .map(|c| c.name.as_str())
            .collect()
    }
}

impl FittedModel {
    /// Build the summary the presentation layer consumes
    pub fn summary(&self) -> ModelSummary {
        let mut coefficients = Vec::with_capacity(self.coefficients().len() + 1);
        coefficients.push(CoefficientSummary {
            name: "(intercept)".to_string(),
            estimate: self.intercept(),
            std_error: self.std_errors()[0],
            t_stat: self.t_stats()[0],
            p_value: self.p_values()[0],
        });
        for (j, name) in self.feature_names().iter().enumerate() {
            coefficients.push(CoefficientSummary {
                name: name.clone(),
                estimate: self.coefficients()[j],
                std_error: self.std_errors()[j + 1],
                t_stat: self.t_stats()[j + 1],
                p_value: self.p_values()[j + 1],
            });
        }
        ModelSummary {
            n_obs: self.n_obs(),
            r_squared: self.r_squared(),
            residual_std_error: self.residual_std_error(),
            residual_df: self.residual_df(),
            coefficients,
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OLS model: {} observations, R² = {:.4}, residual SE = {:.4} ({} df)",
            self.n_obs, self.r_squared, self.residual_std_error, self.residual_df
        )?;
        writeln!(
            f,
            "{:<18} {:>10} {:>10} {:>8} {:>10}",
            "term", "estimate", "std err", "t", "p-value"
        )?;
        for c in &self.coefficients {
            writeln!(
                f,
                "{:<18} {:>10.4} {:>10.4} {:>8.2} {:>10.4}",
                c.name, c.estimate, c.std_error, c.t_stat, c.p_value
            )?;
        }
        let significant = self.significant_features(0.05);
        if significant.is_empty() {
            write!(f, "no variables significant at p < 0.05")
        } else {
            write!(f, "significant at p < 0.05: {}", significant.join(", "))
        }
    }
}
