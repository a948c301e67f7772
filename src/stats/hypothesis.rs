//! Parametric hypothesis tests
//!
//! One-sample, paired and two-sample t-tests. Each test reports the
//! statistic, its p-value for the requested alternative, the confidence
//! interval of the difference, Cohen's d, the JZS Bayes factor and the
//! achieved power.

use crate::core::error::{Error, Result};
use crate::stats::bayes::bayesfactor_ttest;
use crate::stats::descriptive::{mean, remove_na, variance};
use crate::stats::distributions::{students_t, t_ppf};
use crate::stats::effsize::{compute_effsize, EffsizeKind};
use crate::stats::power::{power_ttest, power_ttest2n, TTestContrast};
use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;
use std::fmt;
use std::str::FromStr;

/// Alternative hypothesis of a test
///
/// `OneSided` tests in the direction of the observed effect, which gives
/// half of the two-sided p-value. `Greater` and `Less` fix the direction
/// in advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tail {
    #[default]
    #[serde(rename = "two-sided")]
    TwoSided,
    #[serde(rename = "one-sided")]
    OneSided,
    #[serde(rename = "greater")]
    Greater,
    #[serde(rename = "less")]
    Less,
}

impl Tail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tail::TwoSided => "two-sided",
            Tail::OneSided => "one-sided",
            Tail::Greater => "greater",
            Tail::Less => "less",
        }
    }

    /// Resolve `OneSided` into the direction given by the sign of `stat`
    pub fn directed(&self, stat: f64) -> Tail {
        match self {
            Tail::OneSided if stat >= 0.0 => Tail::Greater,
            Tail::OneSided => Tail::Less,
            other => *other,
        }
    }

    /// Combine the two directional p-values of a test into the p-value of
    /// this alternative
    ///
    /// `p_greater` is P(S >= s) and `p_less` is P(S <= s) under the null.
    pub fn combine(&self, p_greater: f64, p_less: f64) -> f64 {
        match self {
            Tail::TwoSided => (2.0 * p_greater.min(p_less)).min(1.0),
            Tail::OneSided => p_greater.min(p_less).min(1.0),
            Tail::Greater => p_greater.min(1.0),
            Tail::Less => p_less.min(1.0),
        }
    }
}

impl fmt::Display for Tail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tail {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "two-sided" => Ok(Tail::TwoSided),
            "one-sided" => Ok(Tail::OneSided),
            "greater" => Ok(Tail::Greater),
            "less" => Ok(Tail::Less),
            other => Err(Error::InvalidValue(format!(
                "Tail must be 'two-sided', 'one-sided', 'greater' or 'less', got '{}'",
                other
            ))),
        }
    }
}

/// Variance assumption of the two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Correction {
    /// Welch when the sample sizes differ, Student otherwise
    #[default]
    Auto,
    /// Welch-Satterthwaite (unequal variances)
    Welch,
    /// Student (pooled variance)
    Student,
}

/// T-test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTestResult {
    /// t-statistic
    pub t: f64,
    /// Degrees of freedom
    pub dof: f64,
    pub tail: Tail,
    /// p-value
    pub p_val: f64,
    /// 95% confidence interval of the mean difference
    pub ci95: (f64, f64),
    /// Absolute Cohen's d
    pub cohen_d: f64,
    /// Bayes factor in favour of the alternative
    pub bf10: f64,
    /// Achieved power at alpha = 0.05
    pub power: f64,
    /// Whether the samples were treated as paired
    pub paired: bool,
}

/// p-value of a t statistic for the given alternative
pub fn t_pvalue(t: f64, dof: f64, tail: Tail) -> Result<f64> {
    if t.is_nan() {
        return Ok(f64::NAN);
    }
    let dist = students_t(dof)?;
    Ok(tail.combine(dist.sf(t), dist.cdf(t)))
}

/// Confidence interval of `diff` with standard error `se`
fn t_confidence_interval(diff: f64, se: f64, dof: f64, tail: Tail, confidence: f64) -> Result<(f64, f64)> {
    match tail.directed(diff) {
        Tail::Greater => {
            let crit = t_ppf(confidence, dof)?;
            Ok((diff - crit * se, f64::INFINITY))
        }
        Tail::Less => {
            let crit = t_ppf(confidence, dof)?;
            Ok((f64::NEG_INFINITY, diff + crit * se))
        }
        Tail::TwoSided | Tail::OneSided => {
            let crit = t_ppf(0.5 + confidence / 2.0, dof)?;
            Ok((diff - crit * se, diff + crit * se))
        }
    }
}

/// One-sample t-test of `x` against the hypothesized mean `mu`
pub fn ttest_one_sample(x: &[f64], mu: f64, tail: Tail) -> Result<TTestResult> {
    let x: Vec<f64> = x.iter().copied().filter(|v| !v.is_nan()).collect();
    let nx = x.len();
    if nx < 2 {
        return Err(Error::InsufficientData(
            "One-sample t-test needs at least two observations".into(),
        ));
    }

    let n = nx as f64;
    let diff = mean(&x) - mu;
    let se = (variance(&x) / n).sqrt();
    let t = diff / se;
    let dof = n - 1.0;

    let p_val = t_pvalue(t, dof, tail)?;
    let ci95 = t_confidence_interval(diff, se, dof, tail, 0.95)?;

    let d = diff / variance(&x).sqrt();
    let bf10 = bayesfactor_ttest(t, nx, None, false, tail, 0.707)?;
    let power = power_ttest(d.abs(), nx, 0.05, TTestContrast::OneSample, power_tail(tail))?;

    Ok(TTestResult {
        t,
        dof,
        tail,
        p_val,
        ci95,
        cohen_d: d.abs(),
        bf10,
        power,
        paired: false,
    })
}

/// Two-sample t-test
///
/// Missing values are removed (pairwise when `paired`). Paired samples that
/// still differ in length are tested as independent samples.
pub fn ttest(x: &[f64], y: &[f64], paired: bool, tail: Tail, correction: Correction) -> Result<TTestResult> {
    let (x, y) = remove_na(x, y, paired);
    let nx = x.len();
    let ny = y.len();

    let mut paired = paired;
    if paired && nx != ny {
        log::warn!(
            "x and y have unequal sizes ({} vs {}); switching to an unpaired t-test",
            nx,
            ny
        );
        paired = false;
    }

    if nx < 2 || ny < 2 {
        return Err(Error::InsufficientData(format!(
            "t-test needs at least two observations per sample, got {} and {}",
            nx, ny
        )));
    }

    let (nxf, nyf) = (nx as f64, ny as f64);
    let diff = mean(&x) - mean(&y);
    let (vx, vy) = (variance(&x), variance(&y));

    let (t, dof, se) = if paired {
        let differences: Vec<f64> = x.iter().zip(y.iter()).map(|(a, b)| a - b).collect();
        let se = (variance(&differences) / nxf).sqrt();
        (diff / se, nxf - 1.0, se)
    } else {
        let welch = match correction {
            Correction::Auto => nx != ny,
            Correction::Welch => true,
            Correction::Student => false,
        };
        if welch {
            let se = (vx / nxf + vy / nyf).sqrt();
            // Welch-Satterthwaite equation for degrees of freedom
            let numerator = (vx / nxf + vy / nyf).powi(2);
            let denominator = (vx / nxf).powi(2) / (nxf - 1.0) + (vy / nyf).powi(2) / (nyf - 1.0);
            (diff / se, numerator / denominator, se)
        } else {
            let pooled_var = ((nxf - 1.0) * vx + (nyf - 1.0) * vy) / (nxf + nyf - 2.0);
            let se = (pooled_var * (1.0 / nxf + 1.0 / nyf)).sqrt();
            (diff / se, nxf + nyf - 2.0, se)
        }
    };

    let p_val = t_pvalue(t, dof, tail)?;
    let ci95 = t_confidence_interval(diff, se, dof, tail, 0.95)?;

    let d = compute_effsize(&x, &y, paired, EffsizeKind::Cohen)?.unwrap_or(f64::NAN);
    let bf10 = bayesfactor_ttest(t, nx, Some(ny), paired, tail, 0.707)?;
    let power = if paired {
        power_ttest(d.abs(), nx, 0.05, TTestContrast::Paired, power_tail(tail))?
    } else {
        power_ttest2n(nx, ny, d.abs(), 0.05, power_tail(tail))?
    };

    Ok(TTestResult {
        t,
        dof,
        tail,
        p_val,
        ci95,
        cohen_d: d.abs(),
        bf10,
        power,
        paired,
    })
}

/// Power is computed on |d|, so a directional alternative is expressed
/// as `Greater`
fn power_tail(tail: Tail) -> Tail {
    match tail {
        Tail::TwoSided => Tail::TwoSided,
        _ => Tail::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_parsing() {
        assert_eq!("two-sided".parse::<Tail>().unwrap(), Tail::TwoSided);
        assert_eq!("less".parse::<Tail>().unwrap(), Tail::Less);
        for bad in ["upper", "TwoSided", "", "two_sided"] {
            let err = bad.parse::<Tail>().unwrap_err();
            assert!(err.is_value_error());
        }
    }

    #[test]
    fn test_tail_combine() {
        assert!((Tail::TwoSided.combine(0.02, 0.98) - 0.04).abs() < 1e-12);
        assert!((Tail::OneSided.combine(0.98, 0.02) - 0.02).abs() < 1e-12);
        assert!((Tail::Greater.combine(0.98, 0.02) - 0.98).abs() < 1e-12);
        assert!((Tail::TwoSided.combine(0.7, 0.6) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_student_ttest() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [3.0, 4.0, 5.0, 6.0, 7.0];
        let result = ttest(&x, &y, false, Tail::TwoSided, Correction::Auto).unwrap();
        assert!((result.t + 2.0).abs() < 1e-12);
        assert!((result.dof - 8.0).abs() < 1e-12);
        assert!((result.p_val - 0.080516).abs() < 1e-5);
        assert!((result.cohen_d - 2.0 / 2.5f64.sqrt()).abs() < 1e-12);
        assert!(result.ci95.0 < -2.0 && result.ci95.1 > -2.0);

        let one_sided = ttest(&x, &y, false, Tail::OneSided, Correction::Auto).unwrap();
        assert!((one_sided.p_val - result.p_val / 2.0).abs() < 1e-12);

        let wrong_way = ttest(&x, &y, false, Tail::Greater, Correction::Auto).unwrap();
        assert!(wrong_way.p_val > 0.9);
    }

    #[test]
    fn test_welch_ttest() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let result = ttest(&x, &y, false, Tail::TwoSided, Correction::Auto).unwrap();
        // Welch degrees of freedom fall between min(n) - 1 and nx + ny - 2
        assert!(result.dof > 3.0 && result.dof < 8.0);
        assert!(result.p_val > 0.0 && result.p_val < 1.0);
    }

    #[test]
    fn test_paired_ttest() {
        let x = [2.0, 4.0, 6.0, 8.0, 10.0];
        let y = [1.0, 3.0, 4.0, 7.0, 8.0];
        let result = ttest(&x, &y, true, Tail::TwoSided, Correction::Auto).unwrap();
        // Differences are [1, 1, 2, 1, 2]: mean 1.4, sd sqrt(0.3)
        let expected_t = 1.4 / (0.3f64 / 5.0).sqrt();
        assert!((result.t - expected_t).abs() < 1e-10);
        assert!((result.dof - 4.0).abs() < 1e-12);
        assert!(result.paired);
    }

    #[test]
    fn test_paired_with_unequal_sizes_falls_back() {
        let x = [2.0, 4.0, 6.0, 8.0, 10.0];
        let y = [1.0, 3.0, 4.0, 7.0];
        let result = ttest(&x, &y, true, Tail::TwoSided, Correction::Auto).unwrap();
        assert!(!result.paired);
    }

    #[test]
    fn test_one_sample_ttest() {
        let x = [5.1, 4.9, 5.3, 5.5, 4.7, 5.0];
        let result = ttest_one_sample(&x, 5.0, Tail::TwoSided).unwrap();
        assert!((result.dof - 5.0).abs() < 1e-12);
        assert!(result.p_val > 0.3);
        assert!(ttest_one_sample(&[1.0], 0.0, Tail::TwoSided).is_err());
    }
}
