//! Statistical power of t-tests and correlations

use crate::core::error::{Error, Result};
use crate::stats::distributions::{normal_cdf, t_ppf, Distribution, NoncentralT};
use crate::stats::hypothesis::Tail;
use serde::{Deserialize, Serialize};

/// Design of a t-test for power analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TTestContrast {
    OneSample,
    Paired,
    /// Two independent samples of equal size
    TwoSamples,
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidValue(format!(
            "alpha must be between 0 and 1, got {}",
            alpha
        )))
    }
}

/// Power of a t statistic with noncentrality `nc` against the critical
/// region of `tail`
fn noncentral_power(nc: f64, dof: f64, alpha: f64, tail: Tail) -> Result<f64> {
    let dist = NoncentralT::new(dof, nc)?;
    let power = match tail.directed(nc) {
        Tail::Less => {
            let tcrit = t_ppf(alpha, dof)?;
            dist.cdf(tcrit)
        }
        Tail::Greater => {
            let tcrit = t_ppf(1.0 - alpha, dof)?;
            dist.sf(tcrit)
        }
        Tail::TwoSided | Tail::OneSided => {
            let tcrit = t_ppf(1.0 - alpha / 2.0, dof)?;
            dist.sf(tcrit) + dist.cdf(-tcrit)
        }
    };
    Ok(power.clamp(0.0, 1.0))
}

/// Achieved power of a t-test with effect size `d` and `n` observations
/// (per group for `TwoSamples`)
pub fn power_ttest(d: f64, n: usize, alpha: f64, contrast: TTestContrast, tail: Tail) -> Result<f64> {
    validate_alpha(alpha)?;
    if n < 2 {
        return Err(Error::InsufficientData(
            "Power analysis needs at least two observations".into(),
        ));
    }
    if d.is_nan() {
        return Ok(f64::NAN);
    }

    let nf = n as f64;
    let (nc, dof) = match contrast {
        TTestContrast::OneSample | TTestContrast::Paired => (d * nf.sqrt(), nf - 1.0),
        TTestContrast::TwoSamples => (d * (nf / 2.0).sqrt(), 2.0 * (nf - 1.0)),
    };
    noncentral_power(nc, dof, alpha, tail)
}

/// Achieved power of an independent t-test with unequal sample sizes
pub fn power_ttest2n(nx: usize, ny: usize, d: f64, alpha: f64, tail: Tail) -> Result<f64> {
    validate_alpha(alpha)?;
    if nx < 2 || ny < 2 {
        return Err(Error::InsufficientData(
            "Power analysis needs at least two observations per group".into(),
        ));
    }
    if d.is_nan() {
        return Ok(f64::NAN);
    }

    let (nxf, nyf) = (nx as f64, ny as f64);
    let nc = d * (nxf * nyf / (nxf + nyf)).sqrt();
    noncentral_power(nc, nxf + nyf - 2.0, alpha, tail)
}

/// Achieved power of a Pearson correlation test (Fisher z approximation)
///
/// Returns NaN for fewer than five observations.
pub fn power_corr(r: f64, n: usize, alpha: f64, tail: Tail) -> Result<f64> {
    validate_alpha(alpha)?;
    if n <= 4 || r.is_nan() {
        return Ok(f64::NAN);
    }
    if !(-1.0..=1.0).contains(&r) {
        return Err(Error::InvalidValue(format!(
            "Correlation coefficient must be within [-1, 1], got {}",
            r
        )));
    }

    let nf = n as f64;
    let dof = nf - 2.0;
    let zr = r.atanh() + r / (2.0 * (nf - 1.0));
    let scale = (nf - 3.0).sqrt();

    let critical_z = |p: f64| -> Result<f64> {
        let ttt = t_ppf(p, dof)?;
        let rc = (ttt * ttt / (ttt * ttt + dof)).sqrt();
        Ok(rc.atanh())
    };

    let power = match tail.directed(r) {
        Tail::Greater => {
            let zrc = critical_z(1.0 - alpha)?;
            normal_cdf((zr - zrc) * scale)
        }
        Tail::Less => {
            let zrc = critical_z(1.0 - alpha)?;
            normal_cdf((-zr - zrc) * scale)
        }
        Tail::TwoSided | Tail::OneSided => {
            let zrc = critical_z(1.0 - alpha / 2.0)?;
            normal_cdf((zr - zrc) * scale) + normal_cdf((-zr - zrc) * scale)
        }
    };
    Ok(power.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_at_null_is_alpha() {
        let power = power_ttest(0.0, 20, 0.05, TTestContrast::TwoSamples, Tail::TwoSided).unwrap();
        assert!((power - 0.05).abs() < 1e-4);

        let power = power_ttest2n(15, 25, 0.0, 0.05, Tail::TwoSided).unwrap();
        assert!((power - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_power_ttest_reference() {
        // Two groups of 20 with d = 0.5
        let power = power_ttest(0.5, 20, 0.05, TTestContrast::TwoSamples, Tail::TwoSided).unwrap();
        assert!((power - 0.3377).abs() < 0.01, "power = {}", power);

        let one_sided = power_ttest(0.5, 20, 0.05, TTestContrast::TwoSamples, Tail::Greater).unwrap();
        assert!(one_sided > power);

        let paired = power_ttest(0.5, 20, 0.05, TTestContrast::Paired, Tail::TwoSided).unwrap();
        assert!(paired > power);
    }

    #[test]
    fn test_power_ttest2n_matches_balanced() {
        let balanced = power_ttest(0.8, 12, 0.05, TTestContrast::TwoSamples, Tail::TwoSided).unwrap();
        let two_n = power_ttest2n(12, 12, 0.8, 0.05, Tail::TwoSided).unwrap();
        assert!((balanced - two_n).abs() < 1e-10);
    }

    #[test]
    fn test_power_corr() {
        let weak = power_corr(0.1, 30, 0.05, Tail::TwoSided).unwrap();
        let strong = power_corr(0.6, 30, 0.05, Tail::TwoSided).unwrap();
        assert!(weak < 0.2);
        assert!(strong > 0.9);
        assert!(power_corr(0.5, 4, 0.05, Tail::TwoSided).unwrap().is_nan());
        assert!(power_corr(0.5, 30, 1.5, Tail::TwoSided).is_err());
    }
}
