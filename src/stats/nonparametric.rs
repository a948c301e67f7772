//! Non-parametric statistical tests
//!
//! This module provides the rank-based counterparts of the t-tests: the
//! Mann-Whitney U test for independent samples and the Wilcoxon signed-rank
//! test for paired samples.

use crate::core::error::{Error, Result};
use crate::stats::descriptive::{rank, remove_na, tie_groups};
use crate::stats::distributions::{normal_cdf, normal_sf};
use crate::stats::effsize::cles;
use crate::stats::hypothesis::Tail;
use serde::{Deserialize, Serialize};

/// Mann-Whitney U test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MannWhitneyResult {
    /// U statistic of the first sample
    pub u_val: f64,
    pub tail: Tail,
    /// p-value
    pub p_val: f64,
    /// Rank-biserial correlation
    pub rbc: f64,
    /// Common language effect size
    pub cles: f64,
    /// Whether the exact null distribution was used
    pub exact: bool,
}

/// Wilcoxon signed-rank test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WilcoxonResult {
    /// Sum of the ranks of the positive differences for a directional
    /// alternative, smaller of the two rank sums otherwise
    pub w_val: f64,
    pub tail: Tail,
    /// p-value
    pub p_val: f64,
    /// Matched-pairs rank-biserial correlation
    pub rbc: f64,
    /// Common language effect size
    pub cles: f64,
    /// Whether the exact null distribution was used
    pub exact: bool,
}

/// Mann-Whitney U test (Wilcoxon rank-sum test)
///
/// The exact null distribution is used when both samples have fewer than 8
/// observations and there are no ties. Otherwise the normal approximation
/// with tie and continuity corrections is used.
pub fn mwu(x: &[f64], y: &[f64], tail: Tail) -> Result<MannWhitneyResult> {
    let (x, y) = remove_na(x, y, false);
    let n1 = x.len();
    let n2 = y.len();
    if n1 == 0 || n2 == 0 {
        return Err(Error::InsufficientData(
            "Both samples must contain data".into(),
        ));
    }

    // Combine and rank all values
    let combined: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
    let ranks = rank(&combined);
    let r1: f64 = ranks[..n1].iter().sum();

    // Calculate U statistics
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let n1n2 = (n1 * n2) as f64;
    let u2 = n1n2 - u1;

    let ties = tie_groups(&combined);
    let exact = n1 < 8 && n2 < 8 && ties.is_empty();

    let (p_greater, p_less) = if exact {
        let dist = mwu_exact_distribution(n1, n2);
        let total: f64 = dist.iter().sum();
        // U takes integer values when there are no ties
        let u = u1.round() as usize;
        let upper: f64 = dist[u..].iter().sum::<f64>() / total;
        let lower: f64 = dist[..=u].iter().sum::<f64>() / total;
        (upper, lower)
    } else {
        let n = (n1 + n2) as f64;
        let mean_u = n1n2 / 2.0;
        let tie_term: f64 = ties.iter().map(|&t| (t * t * t - t) as f64).sum();
        let sd_u = (n1n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
        if sd_u == 0.0 {
            (1.0, 1.0)
        } else {
            // Continuity correction
            let z_greater = (u1 - mean_u - 0.5) / sd_u;
            let z_less = (u2 - mean_u - 0.5) / sd_u;
            (normal_sf(z_greater), normal_sf(z_less))
        }
    };

    let p_val = tail.combine(p_greater, p_less);

    Ok(MannWhitneyResult {
        u_val: u1,
        tail,
        p_val,
        rbc: 1.0 - 2.0 * u2 / n1n2,
        cles: cles(&x, &y),
        exact,
    })
}

/// Frequencies of the U statistic under the null for sample sizes `m`, `n`
fn mwu_exact_distribution(m: usize, n: usize) -> Vec<f64> {
    // counts[i][j][u]: number of orderings of i and j observations giving U = u
    let max_u = m * n;
    let mut counts = vec![vec![vec![0.0; max_u + 1]; n + 1]; m + 1];
    for i in 0..=m {
        for j in 0..=n {
            if i == 0 || j == 0 {
                counts[i][j][0] = 1.0;
                continue;
            }
            for u in 0..=i * j {
                // The largest observation belongs to either sample
                let from_x = if u >= j { counts[i - 1][j][u - j] } else { 0.0 };
                let from_y = counts[i][j - 1][u];
                counts[i][j][u] = from_x + from_y;
            }
        }
    }
    counts.swap_remove(m).swap_remove(n)
}

/// Wilcoxon signed-rank test for paired samples
///
/// Zero differences are discarded. The exact null distribution is used for
/// at most 50 non-zero differences without ties; otherwise the normal
/// approximation with tie correction is used.
pub fn wilcoxon(x: &[f64], y: &[f64], tail: Tail) -> Result<WilcoxonResult> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch(
            "Paired samples must have the same length".into(),
        ));
    }
    let (x, y) = remove_na(x, y, true);

    let differences: Vec<f64> = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0)
        .collect();

    let n = differences.len();
    if n == 0 {
        return Err(Error::InsufficientData(
            "All paired differences are zero".into(),
        ));
    }

    let abs_diff: Vec<f64> = differences.iter().map(|d| d.abs()).collect();
    let ranks = rank(&abs_diff);

    let w_plus: f64 = differences
        .iter()
        .zip(ranks.iter())
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();
    let rank_total = (n * (n + 1)) as f64 / 2.0;
    let w_minus = rank_total - w_plus;

    let ties = tie_groups(&abs_diff);
    let exact = n <= 50 && ties.is_empty();

    let (p_greater, p_less) = if exact {
        let dist = wilcoxon_exact_distribution(n);
        let total: f64 = dist.iter().sum();
        let w = w_plus.round() as usize;
        let upper: f64 = dist[w..].iter().sum::<f64>() / total;
        let lower: f64 = dist[..=w].iter().sum::<f64>() / total;
        (upper, lower)
    } else {
        let nf = n as f64;
        let mean_w = nf * (nf + 1.0) / 4.0;
        let tie_term: f64 = ties.iter().map(|&t| (t * t * t - t) as f64).sum();
        let sd_w = (nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0 - tie_term / 48.0).sqrt();
        let z = (w_plus - mean_w) / sd_w;
        (normal_sf(z), normal_cdf(z))
    };

    let w_val = match tail {
        Tail::TwoSided => w_plus.min(w_minus),
        _ => w_plus,
    };

    Ok(WilcoxonResult {
        w_val,
        tail,
        p_val: tail.combine(p_greater, p_less),
        rbc: (w_plus - w_minus) / rank_total,
        cles: cles(&x, &y),
        exact,
    })
}

/// Frequencies of the signed-rank statistic W+ under the null
fn wilcoxon_exact_distribution(n: usize) -> Vec<f64> {
    let max_w = n * (n + 1) / 2;
    let mut counts = vec![0.0; max_w + 1];
    counts[0] = 1.0;
    for k in 1..=n {
        for w in (k..=max_w).rev() {
            counts[w] += counts[w - k];
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_distributions_sum() {
        // C(7, 3) orderings
        let dist = mwu_exact_distribution(3, 4);
        assert_eq!(dist.len(), 13);
        assert!((dist.iter().sum::<f64>() - 35.0).abs() < 1e-12);
        // Symmetric around m * n / 2
        assert_eq!(dist[0], dist[12]);
        assert_eq!(dist[2], dist[10]);

        let dist = wilcoxon_exact_distribution(5);
        assert!((dist.iter().sum::<f64>() - 32.0).abs() < 1e-12);
        assert_eq!(dist[0], 1.0);
        assert_eq!(dist[15], 1.0);
    }

    #[test]
    fn test_mwu_exact() {
        let x = [1.1, 2.2, 3.3];
        let y = [4.4, 5.5, 6.6];
        let result = mwu(&x, &y, Tail::TwoSided).unwrap();
        assert!(result.exact);
        assert_eq!(result.u_val, 0.0);
        // Complete separation: 2 / C(6, 3)
        assert!((result.p_val - 0.1).abs() < 1e-12);
        assert!((result.rbc + 1.0).abs() < 1e-12);
        assert_eq!(result.cles, 0.0);

        let less = mwu(&x, &y, Tail::Less).unwrap();
        assert!((less.p_val - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_mwu_normal_approximation() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..20).map(|i| i as f64 + 5.5).collect();
        let result = mwu(&x, &y, Tail::TwoSided).unwrap();
        assert!(!result.exact);
        assert!(result.p_val > 0.0 && result.p_val < 0.1);
        assert!(result.rbc < 0.0);

        let one_sided = mwu(&x, &y, Tail::OneSided).unwrap();
        assert!((one_sided.p_val - result.p_val / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_wilcoxon_exact() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.5, 4.5, 6.5, 8.5, 10.5];
        // All differences negative with distinct magnitudes
        let result = wilcoxon(&x, &y, Tail::TwoSided).unwrap();
        assert!(result.exact);
        assert_eq!(result.w_val, 0.0);
        assert!((result.p_val - 2.0 / 32.0).abs() < 1e-12);
        assert!((result.rbc + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wilcoxon_drops_zero_differences() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!(wilcoxon(&x, &y, Tail::TwoSided).is_err());
        assert!(wilcoxon(&x, &y[..3], Tail::TwoSided).is_err());
    }

    #[test]
    fn test_wilcoxon_with_ties_uses_normal() {
        let x = [3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0, 17.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 20.0];
        let result = wilcoxon(&x, &y, Tail::TwoSided).unwrap();
        assert!(!result.exact);
        assert!(result.p_val > 0.0 && result.p_val <= 1.0);
    }
}
