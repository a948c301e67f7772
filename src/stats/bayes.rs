//! Bayes factors
//!
//! Both Bayes factors are ratios of marginal likelihoods expressed as
//! integrals over a scale parameter `g` on (0, inf), evaluated in log space
//! with Gauss-Legendre quadrature after the substitution `g = exp(s)`.

use crate::core::error::{Error, Result};
use crate::stats::hypothesis::Tail;
use crate::stats::quadrature::GaussLegendre;
use statrs::function::gamma::ln_gamma;
use std::f64::consts::PI;

const S_MIN: f64 = -25.0;
const S_MAX: f64 = 40.0;
const PANELS: usize = 600;

/// JZS Bayes factor of a t-test (Rouder et al. 2009)
///
/// * `nx`, `ny`: sample sizes. A one-sample test has `ny = None`; paired
///   samples are handled as a one-sample test of size `nx`.
/// * `r`: scale of the Cauchy prior on the effect size.
///
/// A one-sided alternative doubles the Bayes factor; when the observed
/// effect contradicts the direction of `tail`, the reciprocal is returned.
pub fn bayesfactor_ttest(t: f64, nx: usize, ny: Option<usize>, paired: bool, tail: Tail, r: f64) -> Result<f64> {
    if !(r > 0.0) {
        return Err(Error::InvalidValue(format!(
            "Prior scale must be positive, got {}",
            r
        )));
    }
    if t.is_nan() {
        return Ok(f64::NAN);
    }

    let one_sample = paired || matches!(ny, None | Some(1));
    let (n, df) = match ny {
        Some(ny) if !one_sample => {
            let (nx, ny) = (nx as f64, ny as f64);
            (nx * ny / (nx + ny), nx + ny - 2.0)
        }
        _ => (nx as f64, nx as f64 - 1.0),
    };
    if !(df > 0.0) {
        return Err(Error::InsufficientData(
            "Bayes factor needs at least two observations".into(),
        ));
    }

    let r2 = r * r;
    let t2 = t * t;
    // Log of the null likelihood, folded into the integrand to keep the
    // result in range for large t
    let ln_null = -(df + 1.0) / 2.0 * (1.0 + t2 / df).ln();

    let ln_integrand = |g: f64| {
        let ngr = 1.0 + n * g * r2;
        -0.5 * ngr.ln() - (df + 1.0) / 2.0 * (1.0 + t2 / (ngr * df)).ln()
            - 0.5 * (2.0 * PI).ln()
            - 1.5 * g.ln()
            - 1.0 / (2.0 * g)
            - ln_null
    };

    let rule = GaussLegendre::new(16);
    let mut bf10 = rule.integrate_positive_log(ln_integrand, S_MIN, S_MAX, PANELS);

    if tail != Tail::TwoSided {
        bf10 *= 2.0;
    }
    let contradicts = match tail {
        Tail::Greater => t < 0.0,
        Tail::Less => t > 0.0,
        _ => false,
    };
    if contradicts && bf10 > 1.0 {
        bf10 = 1.0 / bf10;
    }

    Ok(bf10)
}

/// Bayes factor of a Pearson correlation (Jeffreys 1961, Wetzels and
/// Wagenmakers 2012)
pub fn bayesfactor_pearson(r: f64, n: usize) -> Result<f64> {
    if n < 3 {
        return Err(Error::InsufficientData(
            "Bayes factor of a correlation needs at least three observations".into(),
        ));
    }
    if r.is_nan() {
        return Ok(f64::NAN);
    }
    if !(-1.0..=1.0).contains(&r) {
        return Err(Error::InvalidValue(format!(
            "Correlation coefficient must be within [-1, 1], got {}",
            r
        )));
    }

    let n = n as f64;
    let one_minus_r2 = 1.0 - r * r;
    let ln_integrand = |g: f64| {
        ((n - 2.0) / 2.0) * (1.0 + g).ln() - ((n - 1.0) / 2.0) * (1.0 + one_minus_r2 * g).ln()
            - 1.5 * g.ln()
            - n / (2.0 * g)
    };

    let rule = GaussLegendre::new(16);
    let integral = rule.integrate_positive_log(ln_integrand, S_MIN, S_MAX, PANELS);

    // sqrt(n / 2) / Gamma(1 / 2)
    let constant = ((n / 2.0).ln() / 2.0 - ln_gamma(0.5)).exp();
    Ok(constant * integral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayesfactor_ttest_null_effect() {
        // With t = 0 the data favour the null
        let bf = bayesfactor_ttest(0.0, 20, Some(20), false, Tail::TwoSided, 0.707).unwrap();
        assert!(bf < 1.0 && bf > 0.0);
    }

    #[test]
    fn test_bayesfactor_ttest_monotone_in_t() {
        let small = bayesfactor_ttest(1.0, 30, None, false, Tail::TwoSided, 0.707).unwrap();
        let large = bayesfactor_ttest(4.0, 30, None, false, Tail::TwoSided, 0.707).unwrap();
        assert!(large > small);
        assert!(large > 10.0);
    }

    #[test]
    fn test_bayesfactor_ttest_reference() {
        // One-sample t = 2.5 with n = 20
        let bf = bayesfactor_ttest(2.5, 20, None, false, Tail::TwoSided, 0.707).unwrap();
        assert!((bf - 2.702).abs() < 0.01, "bf = {}", bf);
    }

    #[test]
    fn test_bayesfactor_ttest_tails() {
        let two = bayesfactor_ttest(3.0, 25, Some(25), false, Tail::TwoSided, 0.707).unwrap();
        let greater = bayesfactor_ttest(3.0, 25, Some(25), false, Tail::Greater, 0.707).unwrap();
        let less = bayesfactor_ttest(3.0, 25, Some(25), false, Tail::Less, 0.707).unwrap();
        assert!((greater - 2.0 * two).abs() < 1e-9 * greater);
        assert!((less - 1.0 / greater).abs() < 1e-12);
    }

    #[test]
    fn test_bayesfactor_pearson() {
        let weak = bayesfactor_pearson(0.05, 100).unwrap();
        let strong = bayesfactor_pearson(0.6, 50).unwrap();
        assert!(weak < 1.0);
        assert!(strong > 100.0);
        assert!(bayesfactor_pearson(0.5, 2).is_err());
        assert!(bayesfactor_pearson(1.5, 10).is_err());
    }
}
