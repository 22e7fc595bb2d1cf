//! Student-t distribution routines
//!
//! CDF via the regularized incomplete beta function and quantiles via
//! bisection on the CDF. Used for coefficient p-values and the critical
//! values of prediction intervals.

/// Lanczos approximation of ln Γ(x) for x > 0
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];

    let mut y = x;
    let tmp = x + 5.5;
    let tmp = (x + 0.5) * tmp.ln() - tmp;
    let mut ser = 1.000000000190015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    tmp + (2.5066282746310005 * ser / x).ln()
}

/// Continued fraction for the incomplete beta function (modified Lentz)
fn betacf(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 3.0e-14;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Regularized incomplete beta function I_x(a, b)
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // Use the continued fraction directly where it converges fast,
    // otherwise via the symmetry relation
    if x < (a + 1.0) / (a + b + 2.0) {
        front * betacf(a, b, x) / a
    } else {
        1.0 - front * betacf(b, a, 1.0 - x) / b
    }
}

/// CDF of the Student-t distribution with `df` degrees of freedom
pub fn student_t_cdf(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t == 0.0 {
        return 0.5;
    }
    if t.is_infinite() {
        return if t > 0.0 { 1.0 } else { 0.0 };
    }

    let x = df / (df + t * t);
    let tail = 0.5 * incomplete_beta(0.5 * df, 0.5, x);
    if t > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Two-sided p-value for a t-statistic against the null of zero effect
pub fn two_sided_p_value(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    let p = 2.0 * (1.0 - student_t_cdf(t.abs(), df));
    p.clamp(0.0, 1.0)
}

/// Quantile (inverse CDF) of the Student-t distribution.
///
/// Bisection on the CDF; the distribution is symmetric so only the upper
/// tail is searched.
pub fn student_t_quantile(p: f64, df: f64) -> f64 {
    debug_assert!(p > 0.0 && p < 1.0, "quantile probability out of range");

    if (p - 0.5).abs() < f64::EPSILON {
        return 0.0;
    }
    if p < 0.5 {
        return -student_t_quantile(1.0 - p, df);
    }

    // Expand the bracket until the CDF exceeds p
    let mut hi = 1.0;
    while student_t_cdf(hi, df) < p && hi < 1.0e10 {
        hi *= 2.0;
    }
    let mut lo = 0.0;

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if student_t_cdf(mid, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1.0e-12 {
            break;
        }
    }

    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_at_zero() {
        assert!((student_t_cdf(0.0, 10.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cdf_symmetry() {
        let df = 8.0;
        for t in [0.5, 1.0, 2.5] {
            let upper = student_t_cdf(t, df);
            let lower = student_t_cdf(-t, df);
            assert!((upper + lower - 1.0).abs() < 1e-10, "t = {}", t);
        }
    }

    #[test]
    fn test_cdf_known_value() {
        // t = 2.0, df = 10: CDF ≈ 0.96331
        let cdf = student_t_cdf(2.0, 10.0);
        assert!((cdf - 0.96331).abs() < 1e-4, "cdf = {}", cdf);
    }

    #[test]
    fn test_quantile_approaches_normal() {
        // Large df approaches the standard normal: z(0.975) ≈ 1.95996
        let q = student_t_quantile(0.975, 10_000.0);
        assert!((q - 1.960).abs() < 5e-3, "q = {}", q);
    }

    #[test]
    fn test_quantile_known_value() {
        // t(0.975, 10) ≈ 2.22814
        let q = student_t_quantile(0.975, 10.0);
        assert!((q - 2.22814).abs() < 1e-4, "q = {}", q);
    }

    #[test]
    fn test_quantile_round_trip() {
        let df = 13.0;
        for p in [0.6, 0.9, 0.975, 0.995] {
            let q = student_t_quantile(p, df);
            assert!((student_t_cdf(q, df) - p).abs() < 1e-9, "p = {}", p);
        }
    }

    #[test]
    fn test_quantile_symmetry() {
        let df = 7.0;
        let upper = student_t_quantile(0.975, df);
        let lower = student_t_quantile(0.025, df);
        assert!((upper + lower).abs() < 1e-9);
    }

    #[test]
    fn test_p_value_extremes() {
        assert!((two_sided_p_value(0.0, 12.0) - 1.0).abs() < 1e-12);
        assert!(two_sided_p_value(f64::INFINITY, 12.0) < 1e-12);
        assert!(two_sided_p_value(50.0, 12.0) < 1e-10);
    }
}
