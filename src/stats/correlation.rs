//! Correlation coefficients and their significance
//!
//! Besides Pearson, Spearman and Kendall's tau-b, two robust coefficients are
//! provided: the percentage bend correlation (Wilcox 1994) and the biweight
//! midcorrelation.

use crate::core::error::{Error, Result};
use crate::stats::bayes::bayesfactor_pearson;
use crate::stats::descriptive::{median, rank, remove_na};
use crate::stats::distributions::{normal_cdf, normal_ppf, normal_sf};
use crate::stats::effsize::pearson_r;
use crate::stats::hypothesis::{t_pvalue, Tail};
use crate::stats::power::power_corr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correlation methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
    /// Percentage bend correlation
    Percbend,
    /// Biweight midcorrelation
    Bicor,
}

impl CorrMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrMethod::Pearson => "pearson",
            CorrMethod::Spearman => "spearman",
            CorrMethod::Kendall => "kendall",
            CorrMethod::Percbend => "percbend",
            CorrMethod::Bicor => "bicor",
        }
    }
}

impl fmt::Display for CorrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pearson" => Ok(CorrMethod::Pearson),
            "spearman" => Ok(CorrMethod::Spearman),
            "kendall" => Ok(CorrMethod::Kendall),
            "percbend" => Ok(CorrMethod::Percbend),
            "bicor" => Ok(CorrMethod::Bicor),
            other => Err(Error::InvalidValue(format!(
                "Correlation method not recognized: '{}'",
                other
            ))),
        }
    }
}

/// Correlation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrResult {
    /// Number of complete pairs
    pub n: usize,
    /// Correlation coefficient
    pub r: f64,
    /// Parametric 95% confidence interval (Fisher z)
    pub ci95: (f64, f64),
    pub r2: f64,
    /// Adjusted r2 for one predictor
    pub adj_r2: f64,
    /// p-value
    pub p_val: f64,
    /// Bayes factor (Pearson only)
    pub bf10: Option<f64>,
    /// Achieved power at alpha = 0.05
    pub power: f64,
}

/// p-value of a correlation coefficient through its t statistic
fn r_pvalue(r: f64, n: usize, tail: Tail) -> Result<f64> {
    if r.is_nan() {
        return Ok(f64::NAN);
    }
    let dof = n as f64 - 2.0;
    let t = r * (dof / (1.0 - r * r)).sqrt();
    t_pvalue(t, dof, tail)
}

/// Pearson correlation coefficient and p-value
pub fn pearson(x: &[f64], y: &[f64], tail: Tail) -> Result<(f64, f64)> {
    let r = pearson_r(x, y).clamp(-1.0, 1.0);
    Ok((r, r_pvalue(r, x.len(), tail)?))
}

/// Spearman rank correlation coefficient and p-value
pub fn spearman(x: &[f64], y: &[f64], tail: Tail) -> Result<(f64, f64)> {
    pearson(&rank(x), &rank(y), tail)
}

/// Sums over tie groups used by the tau-b variance:
/// sum t(t-1)/2, sum t(t-1)(t-2), sum t(t-1)(2t+5)
fn tie_sums(data: &[f64]) -> (f64, f64, f64) {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let (mut pairs, mut cubic, mut var_term) = (0.0, 0.0, 0.0);
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let t = (j - i) as f64;
        pairs += t * (t - 1.0) / 2.0;
        cubic += t * (t - 1.0) * (t - 2.0);
        var_term += t * (t - 1.0) * (2.0 * t + 5.0);
        i = j;
    }
    (pairs, cubic, var_term)
}

/// Kendall's tau-b and its p-value (normal approximation with tie
/// correction)
pub fn kendall(x: &[f64], y: &[f64], tail: Tail) -> Result<(f64, f64)> {
    let n = x.len();
    let mut concordant_minus_discordant = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let s = (x[i] - x[j]).signum() * (y[i] - y[j]).signum();
            // signum(0) is 1 for floats, so ties are excluded explicitly
            if x[i] != x[j] && y[i] != y[j] {
                concordant_minus_discordant += s;
            }
        }
    }

    let nf = n as f64;
    let n0 = nf * (nf - 1.0) / 2.0;
    let (x_pairs, x_cubic, x_var) = tie_sums(x);
    let (y_pairs, y_cubic, y_var) = tie_sums(y);

    let tau = concordant_minus_discordant / ((n0 - x_pairs) * (n0 - y_pairs)).sqrt();

    let m = nf * (nf - 1.0);
    let var = (m * (2.0 * nf + 5.0) - x_var - y_var) / 18.0
        + (2.0 * x_pairs * y_pairs) / m
        + x_cubic * y_cubic / (9.0 * m * (nf - 2.0));
    let z = concordant_minus_discordant / var.sqrt();

    let p = if z.is_nan() {
        f64::NAN
    } else {
        tail.combine(normal_sf(z), normal_cdf(z))
    };
    Ok((tau, p))
}

/// Percentage bend correlation (Wilcox 1994) with bending constant `beta`
pub fn percbend(x: &[f64], y: &[f64], beta: f64, tail: Tail) -> Result<(f64, f64)> {
    if !(0.0..=0.5).contains(&beta) {
        return Err(Error::InvalidValue(format!(
            "beta must be within [0, 0.5], got {}",
            beta
        )));
    }
    let n = x.len();
    let m = (((1.0 - beta) * n as f64).floor() as usize).max(1);

    let bend = |data: &[f64]| -> Vec<f64> {
        let med = median(data);
        let mut deviations: Vec<f64> = data.iter().map(|v| (v - med).abs()).collect();
        deviations.sort_by(|a, b| a.total_cmp(b));
        let omega = deviations[m - 1];

        let psi: Vec<f64> = data
            .iter()
            .map(|v| {
                let p = (v - med) / omega;
                if p.is_finite() {
                    p
                } else {
                    0.0
                }
            })
            .collect();
        let below = psi.iter().filter(|&&p| p < -1.0).count();
        let above = psi.iter().filter(|&&p| p > 1.0).count();
        let inner_sum: f64 = data
            .iter()
            .zip(psi.iter())
            .filter(|(_, p)| (-1.0..=1.0).contains(*p))
            .map(|(v, _)| v)
            .sum();
        let pbos = (inner_sum + omega * (above as f64 - below as f64)) / (n - below - above) as f64;

        data.iter()
            .map(|v| ((v - pbos) / omega).clamp(-1.0, 1.0))
            .collect()
    };

    let a = bend(x);
    let b = bend(y);
    let num: f64 = a.iter().zip(b.iter()).map(|(p, q)| p * q).sum();
    let den = (a.iter().map(|p| p * p).sum::<f64>() * b.iter().map(|q| q * q).sum::<f64>()).sqrt();
    let r = (num / den).clamp(-1.0, 1.0);
    Ok((r, r_pvalue(r, n, tail)?))
}

/// Biweight midcorrelation with tuning constant `c`
///
/// Returns NaN when either median absolute deviation is zero.
pub fn bicor(x: &[f64], y: &[f64], c: f64, tail: Tail) -> Result<(f64, f64)> {
    let weighted = |data: &[f64]| -> Option<Vec<f64>> {
        let med = median(data);
        let deviations: Vec<f64> = data.iter().map(|v| (v - med).abs()).collect();
        let mad = median(&deviations);
        if mad == 0.0 {
            return None;
        }
        Some(
            data.iter()
                .map(|v| {
                    let u = (v - med) / (c * mad);
                    let w = if u.abs() < 1.0 { (1.0 - u * u).powi(2) } else { 0.0 };
                    (v - med) * w
                })
                .collect(),
        )
    };

    let (a, b) = match (weighted(x), weighted(y)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok((f64::NAN, f64::NAN)),
    };
    let num: f64 = a.iter().zip(b.iter()).map(|(p, q)| p * q).sum();
    let den = a.iter().map(|p| p * p).sum::<f64>().sqrt() * b.iter().map(|q| q * q).sum::<f64>().sqrt();
    let r = (num / den).clamp(-1.0, 1.0);
    Ok((r, r_pvalue(r, x.len(), tail)?))
}

/// Parametric confidence interval of a correlation coefficient
pub fn r_confidence_interval(r: f64, n: usize, confidence: f64) -> (f64, f64) {
    if n <= 3 || r.is_nan() {
        return (f64::NAN, f64::NAN);
    }
    let z = r.atanh();
    let se = 1.0 / (n as f64 - 3.0).sqrt();
    let crit = normal_ppf(0.5 + confidence / 2.0);
    ((z - crit * se).tanh(), (z + crit * se).tanh())
}

/// Correlation between two samples
///
/// Pairs with a missing value on either side are removed first.
pub fn corr(x: &[f64], y: &[f64], tail: Tail, method: CorrMethod) -> Result<CorrResult> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch(
            "x and y must have the same length".into(),
        ));
    }
    let (x, y) = remove_na(x, y, true);
    let n = x.len();
    if n < 3 {
        return Err(Error::InsufficientData(format!(
            "Correlation needs at least three complete pairs, got {}",
            n
        )));
    }

    let (r, p_val) = match method {
        CorrMethod::Pearson => pearson(&x, &y, tail)?,
        CorrMethod::Spearman => spearman(&x, &y, tail)?,
        CorrMethod::Kendall => kendall(&x, &y, tail)?,
        CorrMethod::Percbend => percbend(&x, &y, 0.2, tail)?,
        CorrMethod::Bicor => bicor(&x, &y, 9.0, tail)?,
    };

    let nf = n as f64;
    let r2 = r * r;
    let adj_r2 = 1.0 - (1.0 - r2) * (nf - 1.0) / (nf - 3.0);
    let bf10 = match method {
        CorrMethod::Pearson => Some(bayesfactor_pearson(r, n)?),
        _ => None,
    };

    Ok(CorrResult {
        n,
        r,
        ci95: r_confidence_interval(r, n, 0.95),
        r2,
        adj_r2,
        p_val,
        bf10,
        power: power_corr(r, n, 0.05, tail)?,
    })
}
