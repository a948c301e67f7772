//! Multiple comparison correction of p-values

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// P-value adjustment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PAdjust {
    /// No correction
    #[default]
    #[serde(rename = "none")]
    None,
    /// One-step Bonferroni correction
    #[serde(rename = "bonf", alias = "bonferroni")]
    Bonf,
    /// One-step Sidak correction
    #[serde(rename = "sidak")]
    Sidak,
    /// Step-down Holm-Bonferroni method
    #[serde(rename = "holm")]
    Holm,
    /// Benjamini-Hochberg false discovery rate (independent tests)
    #[serde(rename = "fdr_bh")]
    FdrBh,
    /// Benjamini-Yekutieli false discovery rate (dependent tests)
    #[serde(rename = "fdr_by")]
    FdrBy,
}

impl PAdjust {
    pub fn as_str(&self) -> &'static str {
        match self {
            PAdjust::None => "none",
            PAdjust::Bonf => "bonf",
            PAdjust::Sidak => "sidak",
            PAdjust::Holm => "holm",
            PAdjust::FdrBh => "fdr_bh",
            PAdjust::FdrBy => "fdr_by",
        }
    }
}

impl fmt::Display for PAdjust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PAdjust {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(PAdjust::None),
            "bonf" | "bonferroni" => Ok(PAdjust::Bonf),
            "sidak" => Ok(PAdjust::Sidak),
            "holm" => Ok(PAdjust::Holm),
            "fdr_bh" => Ok(PAdjust::FdrBh),
            "fdr_by" => Ok(PAdjust::FdrBy),
            other => Err(Error::InvalidValue(format!(
                "Multiple comparison method not recognized: '{}'",
                other
            ))),
        }
    }
}

/// Correct p-values for multiple comparisons
///
/// Returns the rejection decision at `alpha` and the corrected p-values, both
/// in the input order. Missing p-values (NaN) stay missing, are never
/// rejected, and do not count towards the number of tests.
pub fn multicomp(p_values: &[f64], alpha: f64, method: PAdjust) -> Result<(Vec<bool>, Vec<f64>)> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::InvalidValue(format!(
            "alpha must be between 0 and 1, got {}",
            alpha
        )));
    }

    // Indices of the valid p-values, sorted ascending
    let mut order: Vec<usize> = (0..p_values.len())
        .filter(|&i| !p_values[i].is_nan())
        .collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let m = order.len();
    let mut corrected = vec![f64::NAN; p_values.len()];

    match method {
        PAdjust::None => {
            for &i in &order {
                corrected[i] = p_values[i];
            }
        }

        PAdjust::Bonf => {
            for &i in &order {
                corrected[i] = (p_values[i] * m as f64).min(1.0);
            }
        }

        PAdjust::Sidak => {
            for &i in &order {
                corrected[i] = 1.0 - (1.0 - p_values[i]).powi(m as i32);
            }
        }

        PAdjust::Holm => {
            let mut max_adj: f64 = 0.0;
            for (rank, &i) in order.iter().enumerate() {
                let adj_p = (p_values[i] * (m - rank) as f64).max(max_adj);
                max_adj = adj_p;
                corrected[i] = adj_p.min(1.0);
            }
        }

        PAdjust::FdrBh | PAdjust::FdrBy => {
            let correction_factor: f64 = if method == PAdjust::FdrBy {
                (1..=m).map(|i| 1.0 / i as f64).sum()
            } else {
                1.0
            };

            // Step-up: walk from the largest p-value keeping a running minimum.
            // The factor m * cf / rank is formed before scaling p.
            let mut min_adj: f64 = 1.0;
            for (rank, &i) in order.iter().enumerate().rev() {
                let factor = m as f64 * correction_factor / (rank + 1) as f64;
                let adj_p = p_values[i] * factor;
                min_adj = min_adj.min(adj_p);
                corrected[i] = min_adj;
            }
        }
    }

    let reject = corrected.iter().map(|&p| !p.is_nan() && p < alpha).collect();
    Ok((reject, corrected))
}
