//! Ordinary least squares fit
//!
//! Solves the normal equations for the wine quality model via Cholesky
//! decomposition with a Gauss-Jordan fallback, and derives the inference
//! quantities (standard errors, t-statistics, p-values, R²) the
//! presentation layer consumes.

use crate::data::Dataset;
use crate::error::FitError;
use crate::regression::distribution::two_sided_p_value;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative tolerance for declaring a pivot (or Cholesky diagonal) zero
const SINGULAR_TOL: f64 = 1e-10;

/// Cholesky factor L of a symmetric positive-definite matrix, A = L·Lᵀ.
///
/// Returns `None` when the matrix is not positive definite, which for a
/// normal-equations matrix means rank deficiency.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }

    let scale = a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    let tol = SINGULAR_TOL * scale.max(1.0);

    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= tol {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

/// Solve L·Lᵀ·x = b given the Cholesky factor L
fn cholesky_solve(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // Forward substitution: L·y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: Lᵀ·x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    x
}

/// Invert a symmetric positive-definite matrix given its Cholesky factor,
/// one identity column at a time
fn cholesky_inverse(l: &Array2<f64>) -> Array2<f64> {
    let n = l.nrows();
    let mut inv = Array2::zeros((n, n));
    for j in 0..n {
        let mut e = Array1::zeros(n);
        e[j] = 1.0;
        let col = cholesky_solve(l, &e);
        inv.column_mut(j).assign(&col);
    }
    inv
}

/// Matrix inversion via Gauss-Jordan elimination with partial pivoting.
/// Fallback for matrices the Cholesky factorization rejects.
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let scale = m.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    let tol = SINGULAR_TOL * scale.max(1.0);

    // Augmented matrix [M | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        // Partial pivot
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        if aug[[col, col]].abs() < tol {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Some(inv)
}

/// An immutable fitted OLS model.
///
/// Created once from a [`Dataset`]; prediction never mutates it, so shared
/// references can serve concurrent queries without synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    feature_names: Vec<String>,
    intercept: f64,
    coefficients: Array1<f64>,
    /// Standard errors for [intercept, coefficients...]
    std_errors: Array1<f64>,
    /// t-statistics for [intercept, coefficients...]
    t_stats: Array1<f64>,
    /// Two-sided p-values for [intercept, coefficients...]
    p_values: Array1<f64>,
    /// (XᵀX)⁻¹ over the augmented design matrix, kept for interval computation
    xtx_inv: Array2<f64>,
    residual_std_error: f64,
    residual_df: usize,
    r_squared: f64,
    residuals: Array1<f64>,
    n_obs: usize,
}

impl FittedModel {
    /// Feature names in the order coefficients are reported
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Per-feature coefficients, excluding the intercept
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Standard errors for intercept followed by each coefficient
    pub fn std_errors(&self) -> &Array1<f64> {
        &self.std_errors
    }

    /// t-statistics for intercept followed by each coefficient
    pub fn t_stats(&self) -> &Array1<f64> {
        &self.t_stats
    }

    /// Two-sided p-values for intercept followed by each coefficient
    pub fn p_values(&self) -> &Array1<f64> {
        &self.p_values
    }

    pub fn residual_std_error(&self) -> f64 {
        self.residual_std_error
    }

    /// Residual degrees of freedom, N − P − 1
    pub fn residual_df(&self) -> usize {
        self.residual_df
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Training residuals in dataset row order
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }

    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    pub(crate) fn xtx_inv(&self) -> &Array2<f64> {
        &self.xtx_inv
    }
}

/// Fit an OLS model on the dataset.
///
/// Builds the augmented design matrix [1 | features], solves the normal
/// equations, and derives residual standard error, R², and per-coefficient
/// inference. Fails when there are too few observations for the residual
/// degrees of freedom or when the features are perfectly collinear.
pub fn fit(dataset: &Dataset) -> Result<FittedModel, FitError> {
    let n = dataset.n_rows();
    let p = dataset.n_features();

    if n <= p + 1 {
        return Err(FitError::InsufficientData {
            n_obs: n,
            n_features: p,
            min: p + 2,
        });
    }
    if dataset.features().iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("feature matrix".to_string()));
    }
    if dataset.target().iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("target vector".to_string()));
    }

    // Augmented design matrix with an intercept column
    let mut x = Array2::ones((n, p + 1));
    for i in 0..n {
        for j in 0..p {
            x[[i, j + 1]] = dataset.features()[[i, j]];
        }
    }
    let y = dataset.target();

    let xtx = x.t().dot(&x);
    let xty = x.t().dot(y);

    // Cholesky first; Gauss-Jordan picks up what it rejects
    let (beta, xtx_inv) = match cholesky_factor(&xtx) {
        Some(l) => (cholesky_solve(&l, &xty), cholesky_inverse(&l)),
        None => {
            let inv = matrix_inverse(&xtx).ok_or(FitError::RankDeficient)?;
            (inv.dot(&xty), inv)
        }
    };

    let fitted = x.dot(&beta);
    let residuals = y - &fitted;
    let sse = residuals.mapv(|r| r * r).sum();
    let residual_df = n - p - 1;
    let residual_std_error = (sse / residual_df as f64).sqrt();

    let y_mean = y.mean().unwrap_or(0.0);
    let sst = y.mapv(|v| (v - y_mean) * (v - y_mean)).sum();
    let r_squared = if sst == 0.0 { 1.0 } else { 1.0 - sse / sst };

    let df = residual_df as f64;
    let mut std_errors = Array1::zeros(p + 1);
    let mut t_stats = Array1::zeros(p + 1);
    let mut p_values = Array1::zeros(p + 1);
    for j in 0..=p {
        let se = residual_std_error * xtx_inv[[j, j]].max(0.0).sqrt();
        std_errors[j] = se;
        if se == 0.0 {
            // Exact fit: a zero coefficient carries no evidence, a nonzero
            // one is unambiguous
            t_stats[j] = if beta[j] == 0.0 { 0.0 } else { f64::INFINITY };
            p_values[j] = if beta[j] == 0.0 { 1.0 } else { 0.0 };
        } else {
            t_stats[j] = beta[j] / se;
            p_values[j] = two_sided_p_value(t_stats[j], df);
        }
    }

    debug!(
        n_obs = n,
        r_squared = r_squared,
        residual_std_error = residual_std_error,
        "fitted OLS model"
    );

    Ok(FittedModel {
        feature_names: dataset.feature_names().to_vec(),
        intercept: beta[0],
        coefficients: beta.slice(ndarray::s![1..]).to_owned(),
        std_errors,
        t_stats,
        p_values,
        xtx_inv,
        residual_std_error,
        residual_df,
        r_squared,
        residuals,
        n_obs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use ndarray::array;

    fn line_dataset() -> Dataset {
        // quality = 5 + 2·alcohol, other features wobble but carry no signal
        let n = 12;
        let mut features = Array2::zeros((n, 5));
        let mut target = Array1::zeros(n);
        for i in 0..n {
            let t = i as f64;
            let alcohol = 9.0 + 0.3 * t;
            features[[i, 0]] = alcohol;
            features[[i, 1]] = 0.5 + 0.01 * (t * 1.7).sin();
            features[[i, 2]] = 0.6 + 0.01 * (t * 0.9).cos();
            features[[i, 3]] = 0.3 + 0.005 * (t * 2.3).sin();
            features[[i, 4]] = 0.996 + 0.0005 * (t * 1.1).cos();
            target[i] = 5.0 + 2.0 * alcohol;
        }
        Dataset::from_arrays(features, target).unwrap()
    }

    #[test]
    fn test_fit_recovers_exact_line() {
        let model = fit(&line_dataset()).unwrap();
        assert!((model.coefficients()[0] - 2.0).abs() < 1e-6, "alcohol coefficient");
        for j in 1..5 {
            assert!(model.coefficients()[j].abs() < 1e-6, "coefficient {}", j);
        }
        assert!((model.intercept() - 5.0).abs() < 1e-5);
        assert!((model.r_squared() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_fit_returns_six_coefficients() {
        let model = fit(&line_dataset()).unwrap();
        assert_eq!(model.coefficients().len(), 5);
        assert_eq!(model.std_errors().len(), 6);
        assert_eq!(model.p_values().len(), 6);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let dataset = line_dataset();
        let a = fit(&dataset).unwrap();
        let b = fit(&dataset).unwrap();
        assert_eq!(a.intercept(), b.intercept());
        assert_eq!(a.coefficients(), b.coefficients());
        assert_eq!(a.residual_std_error(), b.residual_std_error());
    }

    #[test]
    fn test_insufficient_data() {
        // N = 6 rows for 5 features leaves no residual degrees of freedom
        let features = Array2::from_shape_fn((6, 5), |(i, j)| (i * 5 + j) as f64 * 0.37 + 1.0);
        let target = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let dataset = Dataset::from_arrays(features, target).unwrap();
        assert!(matches!(
            fit(&dataset),
            Err(FitError::InsufficientData { n_obs: 6, .. })
        ));
    }

    #[test]
    fn test_rank_deficient() {
        // Second feature is an exact copy of the first
        let n = 10;
        let mut features = Array2::zeros((n, 5));
        let mut target = Array1::zeros(n);
        for i in 0..n {
            let t = i as f64;
            features[[i, 0]] = t;
            features[[i, 1]] = t;
            features[[i, 2]] = (t * 0.7).sin();
            features[[i, 3]] = (t * 1.3).cos();
            features[[i, 4]] = t * t * 0.01;
            target[i] = 1.0 + t;
        }
        let dataset = Dataset::from_arrays(features, target).unwrap();
        assert!(matches!(fit(&dataset), Err(FitError::RankDeficient)));
    }

    #[test]
    fn test_residuals_sum_to_zero() {
        // With an intercept the residuals are orthogonal to the constant column
        let model = fit(&noisy_dataset()).unwrap();
        let sum: f64 = model.residuals().sum();
        assert!(sum.abs() < 1e-8, "residual sum = {}", sum);
    }

    #[test]
    fn test_p_value_signal_vs_noise() {
        let model = fit(&noisy_dataset()).unwrap();
        // Index 1 is the alcohol coefficient (0 is the intercept)
        let signal_p = model.p_values()[1];
        assert!(signal_p < 1e-6, "signal p = {}", signal_p);
        // The pure-wobble features carry no signal
        for j in 2..6 {
            assert!(model.p_values()[j] > signal_p, "feature {} p too small", j);
            assert!(model.p_values()[j] > 1e-3, "feature {} p = {}", j, model.p_values()[j]);
        }
    }

    fn noisy_dataset() -> Dataset {
        // Strong alcohol signal plus deterministic pseudo-noise
        let n = 60;
        let mut features = Array2::zeros((n, 5));
        let mut target = Array1::zeros(n);
        for i in 0..n {
            let t = i as f64;
            let alcohol = 9.0 + 0.05 * t;
            features[[i, 0]] = alcohol;
            features[[i, 1]] = 0.5 + 0.1 * (t * 1.7).sin();
            features[[i, 2]] = 0.6 + 0.1 * (t * 0.9).cos();
            features[[i, 3]] = 0.3 + 0.05 * (t * 2.3).sin();
            features[[i, 4]] = 0.996 + 0.002 * (t * 3.1).sin();
            target[i] = 5.0 + 2.0 * alcohol + 0.05 * (t * 7.9).sin();
        }
        Dataset::from_arrays(features, target).unwrap()
    }
}
