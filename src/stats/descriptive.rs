//! Descriptive helpers shared by the tests and effect sizes
//!
//! Sample moments follow the unbiased (ddof = 1) convention throughout.

use statrs::statistics::{Data, Median, Statistics};

/// Arithmetic mean (NaN for an empty sample)
pub fn mean(data: &[f64]) -> f64 {
    data.iter().mean()
}

/// Unbiased sample variance (NaN for fewer than two observations)
pub fn variance(data: &[f64]) -> f64 {
    data.iter().variance()
}

/// Unbiased sample standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    data.iter().std_dev()
}

/// Median of a sample
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    Data::new(data.to_vec()).median()
}

/// Mean and standard deviation ignoring missing values
pub fn nan_mean_std(data: &[f64]) -> (f64, f64) {
    let clean = drop_nan(data);
    (mean(&clean), std_dev(&clean))
}

/// Copy of `data` without NaN entries
pub fn drop_nan(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Remove missing values from one or two samples
///
/// With `paired` and equal lengths, a pair is dropped when either side is
/// missing. Otherwise each sample is cleaned independently.
pub fn remove_na(x: &[f64], y: &[f64], paired: bool) -> (Vec<f64>, Vec<f64>) {
    if paired && x.len() == y.len() {
        x.iter()
            .zip(y.iter())
            .filter(|(a, b)| !a.is_nan() && !b.is_nan())
            .map(|(&a, &b)| (a, b))
            .unzip()
    } else {
        (drop_nan(x), drop_nan(y))
    }
}

/// Ranks with ties replaced by their average rank (1-based)
pub fn rank(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    let mut indexed_data: Vec<(usize, f64)> =
        data.iter().enumerate().map(|(i, &val)| (i, val)).collect();

    indexed_data.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; n];

    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && indexed_data[j].1 == indexed_data[i].1 {
            j += 1;
        }

        let avg_rank = (i + j - 1) as f64 / 2.0 + 1.0;
        for item in &indexed_data[i..j] {
            ranks[item.0] = avg_rank;
        }

        i = j;
    }

    ranks
}

/// Sizes of the groups of tied values (groups of one are omitted)
pub fn tie_groups(data: &[f64]) -> Vec<usize> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut groups = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > 1 {
            groups.push(j - i);
        }
        i = j;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        assert!((variance(&data) - 32.0 / 7.0).abs() < 1e-12);
        assert!((median(&data) - 4.5).abs() < 1e-12);
        assert!(variance(&[1.0]).is_nan());
    }

    #[test]
    fn test_rank_with_ties() {
        let ranks = rank(&[10.0, 20.0, 10.0, 30.0]);
        assert_eq!(ranks, vec![1.5, 3.0, 1.5, 4.0]);
        assert_eq!(tie_groups(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0]), vec![2, 3]);
    }

    #[test]
    fn test_remove_na() {
        let x = [1.0, f64::NAN, 3.0, 4.0];
        let y = [1.0, 2.0, f64::NAN, 4.0];

        let (px, py) = remove_na(&x, &y, true);
        assert_eq!(px, vec![1.0, 4.0]);
        assert_eq!(py, vec![1.0, 4.0]);

        let (ux, uy) = remove_na(&x, &y, false);
        assert_eq!(ux, vec![1.0, 3.0, 4.0]);
        assert_eq!(uy, vec![1.0, 2.0, 4.0]);

        let (mean, std) = nan_mean_std(&x);
        assert!((mean - 8.0 / 3.0).abs() < 1e-12);
        assert!(std > 0.0);
    }
}
