//! Effect sizes
//!
//! Computation of standardized effect sizes from two samples and conversion
//! between effect size types.
//!
//! * Cohen's d uses the pooled standard deviation for independent samples
//!   and the average standard deviation, `sqrt((sx^2 + sy^2) / 2)`, for paired
//!   samples.
//! * Hedges' g applies the small-sample correction of Hedges and Olkin (1985).
//! * Glass's delta divides by the smaller of the two standard deviations.
//! * r is the conversion of McGrath and Meyer (2006); eta-square follows
//!   Cohen (1988); the odds ratio follows Borenstein et al. (2009); AUC is the
//!   normal-theory conversion of Ruscio (2008).
//! * CLES computed from the samples is the exact proportion of pairs where
//!   x exceeds y, ties counting one half.

use crate::core::error::{Error, Result};
use crate::stats::descriptive::{mean, remove_na, std_dev, variance};
use crate::stats::distributions::normal_cdf;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Effect size types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EffsizeKind {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "cohen")]
    Cohen,
    /// Hedges' g
    #[default]
    #[serde(rename = "hedges")]
    Hedges,
    /// Glass's delta
    #[serde(rename = "glass")]
    Glass,
    /// Correlation coefficient
    #[serde(rename = "r")]
    R,
    #[serde(rename = "eta-square")]
    EtaSquare,
    #[serde(rename = "odds-ratio")]
    OddsRatio,
    /// Area under the ROC curve
    #[serde(rename = "AUC")]
    Auc,
    /// Common language effect size
    #[serde(rename = "CLES")]
    Cles,
}

impl EffsizeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffsizeKind::None => "none",
            EffsizeKind::Cohen => "cohen",
            EffsizeKind::Hedges => "hedges",
            EffsizeKind::Glass => "glass",
            EffsizeKind::R => "r",
            EffsizeKind::EtaSquare => "eta-square",
            EffsizeKind::OddsRatio => "odds-ratio",
            EffsizeKind::Auc => "AUC",
            EffsizeKind::Cles => "CLES",
        }
    }
}

impl fmt::Display for EffsizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffsizeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(EffsizeKind::None),
            "cohen" => Ok(EffsizeKind::Cohen),
            "hedges" => Ok(EffsizeKind::Hedges),
            "glass" => Ok(EffsizeKind::Glass),
            "r" => Ok(EffsizeKind::R),
            "eta-square" => Ok(EffsizeKind::EtaSquare),
            "odds-ratio" => Ok(EffsizeKind::OddsRatio),
            "auc" => Ok(EffsizeKind::Auc),
            "cles" => Ok(EffsizeKind::Cles),
            other => Err(Error::InvalidValue(format!(
                "Effect size type not recognized: '{}'",
                other
            ))),
        }
    }
}

/// Common language effect size: P(X > Y) + 0.5 * P(X = Y)
pub fn cles(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || y.is_empty() {
        return f64::NAN;
    }
    let mut score = 0.0;
    for &a in x {
        for &b in y {
            if a > b {
                score += 1.0;
            } else if a == b {
                score += 0.5;
            }
        }
    }
    score / (x.len() * y.len()) as f64
}

/// Pearson correlation coefficient of two equal-length samples
pub(crate) fn pearson_r(x: &[f64], y: &[f64]) -> f64 {
    let (mx, my) = (mean(x), mean(y));
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    sxy / (sxx * syy).sqrt()
}

/// Effect size between two samples
///
/// Missing values are removed first (pairwise when `paired`). Returns `None`
/// for `EffsizeKind::None`.
pub fn compute_effsize(x: &[f64], y: &[f64], paired: bool, eftype: EffsizeKind) -> Result<Option<f64>> {
    let (x, y) = remove_na(x, y, paired);
    let (nx, ny) = (x.len(), y.len());
    if nx == 0 || ny == 0 {
        return Err(Error::InsufficientData(
            "Effect size needs non-empty samples".into(),
        ));
    }

    let paired = if paired && nx != ny {
        log::warn!("x and y have unequal sizes; computing an unpaired effect size");
        false
    } else {
        paired
    };

    match eftype {
        EffsizeKind::None => return Ok(None),
        EffsizeKind::R if nx == ny => return Ok(Some(pearson_r(&x, &y))),
        EffsizeKind::R => {
            return Err(Error::DimensionMismatch(
                "r effect size needs samples of equal size".into(),
            ))
        }
        EffsizeKind::Cles => return Ok(Some(cles(&x, &y))),
        EffsizeKind::Glass => {
            let sd_control = std_dev(&x).min(std_dev(&y));
            return Ok(Some((mean(&x) - mean(&y)) / sd_control));
        }
        _ => {}
    }

    let (nxf, nyf) = (nx as f64, ny as f64);
    let d = if paired {
        (mean(&x) - mean(&y)) / ((variance(&x) + variance(&y)) / 2.0).sqrt()
    } else {
        let dof = nxf + nyf - 2.0;
        let pooled_sd = (((nxf - 1.0) * variance(&x) + (nyf - 1.0) * variance(&y)) / dof).sqrt();
        (mean(&x) - mean(&y)) / pooled_sd
    };

    convert_effsize(d, EffsizeKind::Cohen, eftype, Some(nx), Some(ny))
}

/// Effect size of a single sample against the hypothesized mean `mu`
pub fn compute_effsize_one_sample(x: &[f64], mu: f64, eftype: EffsizeKind) -> Result<Option<f64>> {
    let x: Vec<f64> = x.iter().copied().filter(|v| !v.is_nan()).collect();
    if x.len() < 2 {
        return Err(Error::InsufficientData(
            "Effect size needs at least two observations".into(),
        ));
    }
    let d = (mean(&x) - mu) / std_dev(&x);
    match eftype {
        EffsizeKind::Cohen | EffsizeKind::Glass => Ok(Some(d)),
        EffsizeKind::None => Ok(None),
        other => convert_effsize(d, EffsizeKind::Cohen, other, Some(x.len()), None),
    }
}

/// Effect size from a t statistic
///
/// With both sample sizes, `d = t * sqrt(1/nx + 1/ny)`; with the total
/// sample size only, `d = 2t / sqrt(N)`.
pub fn compute_effsize_from_t(
    t: f64,
    nx: Option<usize>,
    ny: Option<usize>,
    total: Option<usize>,
    eftype: EffsizeKind,
) -> Result<Option<f64>> {
    let d = match (nx, ny, total) {
        (Some(nx), Some(ny), _) => t * (1.0 / nx as f64 + 1.0 / ny as f64).sqrt(),
        (_, _, Some(n)) => 2.0 * t / (n as f64).sqrt(),
        _ => {
            return Err(Error::InvalidInput(
                "Either both sample sizes or the total sample size is required".into(),
            ))
        }
    };
    convert_effsize(d, EffsizeKind::Cohen, eftype, nx, ny)
}

/// Convert an effect size from Cohen's d or r to another type
pub fn convert_effsize(
    ef: f64,
    input_type: EffsizeKind,
    output_type: EffsizeKind,
    nx: Option<usize>,
    ny: Option<usize>,
) -> Result<Option<f64>> {
    let d = match input_type {
        EffsizeKind::Cohen => ef,
        EffsizeKind::R => 2.0 * ef / (1.0 - ef * ef).sqrt(),
        other => {
            return Err(Error::InvalidValue(format!(
                "Input effect size must be 'cohen' or 'r', got '{}'",
                other
            )))
        }
    };

    let converted = match output_type {
        EffsizeKind::None => return Ok(None),
        _ if output_type == input_type => ef,
        EffsizeKind::Cohen => d,
        EffsizeKind::Hedges => match (nx, ny) {
            (Some(nx), Some(ny)) => d * (1.0 - 3.0 / (4.0 * (nx + ny) as f64 - 9.0)),
            _ => {
                log::warn!("Sample sizes are required for Hedges' g; returning Cohen's d");
                d
            }
        },
        EffsizeKind::Glass => {
            log::warn!("Glass's delta needs the raw samples; returning the original effect size");
            ef
        }
        EffsizeKind::R => {
            let a = match (nx, ny) {
                (Some(nx), Some(ny)) => {
                    let (nx, ny) = (nx as f64, ny as f64);
                    ((nx + ny).powi(2) - 2.0 * (nx + ny)) / (nx * ny)
                }
                _ => 4.0,
            };
            d / (d * d + a).sqrt()
        }
        EffsizeKind::EtaSquare => (d / 2.0).powi(2) / (1.0 + (d / 2.0).powi(2)),
        EffsizeKind::OddsRatio => (d * PI / 3f64.sqrt()).exp(),
        EffsizeKind::Auc | EffsizeKind::Cles => normal_cdf(d / 2f64.sqrt()),
    };

    Ok(Some(converted))
}
