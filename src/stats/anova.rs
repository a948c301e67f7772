//! One-way analysis of variance

use crate::core::error::{Error, Result};
use crate::dataframe::DataFrame;
use crate::stats::descriptive::drop_nan;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// One-way ANOVA table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnovaResult {
    /// Name of the between-subject factor
    pub source: String,
    /// Between-groups sum of squares
    pub ss_between: f64,
    /// Within-groups sum of squares
    pub ss_within: f64,
    /// Between-groups degrees of freedom
    pub df_between: usize,
    /// Within-groups degrees of freedom
    pub df_within: usize,
    /// Between-groups mean square
    pub ms_between: f64,
    /// Within-groups mean square
    pub ms_within: f64,
    /// F-statistic
    pub f: f64,
    /// Uncorrected p-value
    pub p_unc: f64,
    /// Partial eta-squared
    pub np2: f64,
}

/// One-way ANOVA on already grouped samples
pub fn one_way_anova(groups: &[&[f64]]) -> Result<AnovaResult> {
    if groups.len() < 2 {
        return Err(Error::InvalidValue(
            "At least two groups are required for ANOVA".into(),
        ));
    }

    // Check that all groups have data
    for (i, group) in groups.iter().enumerate() {
        if group.is_empty() {
            return Err(Error::InvalidValue(format!("Group {} is empty", i)));
        }
    }

    let k = groups.len();
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return Err(Error::InsufficientData(
            "ANOVA needs more observations than groups".into(),
        ));
    }

    let group_means: Vec<f64> = groups
        .iter()
        .map(|group| group.iter().sum::<f64>() / group.len() as f64)
        .collect();
    let overall_mean = groups.iter().flat_map(|group| group.iter()).sum::<f64>() / n_total as f64;

    // Calculate sum of squares
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (group, &group_mean) in groups.iter().zip(group_means.iter()) {
        ss_between += group.len() as f64 * (group_mean - overall_mean).powi(2);
        ss_within += group.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = k - 1;
    let df_within = n_total - k;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f = ms_between / ms_within;

    let f_dist = FisherSnedecor::new(df_between as f64, df_within as f64)?;
    let p_unc = if f.is_nan() { f64::NAN } else { f_dist.sf(f) };

    Ok(AnovaResult {
        source: String::new(),
        ss_between,
        ss_within,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f,
        p_unc,
        np2: ss_between / (ss_between + ss_within),
    })
}

/// One-way ANOVA of `dv` by the levels of `between`
///
/// Rows with a missing `dv` are ignored. Groups are listed in the order of
/// first appearance.
pub fn anova(data: &DataFrame, dv: &str, between: &str) -> Result<AnovaResult> {
    let groups: Vec<Vec<f64>> = data
        .group_values(dv, between)?
        .into_iter()
        .map(|(_, values)| drop_nan(&values))
        .filter(|values| !values.is_empty())
        .collect();
    let slices: Vec<&[f64]> = groups.iter().map(Vec::as_slice).collect();

    let mut result = one_way_anova(&slices)?;
    result.source = between.to_string();
    log::debug!(
        "ANOVA {} ~ {}: F({}, {}) = {:.4}, p = {:.4}",
        dv,
        between,
        result.df_between,
        result.df_within,
        result.f,
        result.p_unc
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_anova() {
        let a = [4.0, 5.0, 6.0];
        let b = [6.0, 7.0, 8.0];
        let c = [8.0, 9.0, 10.0];
        let result = one_way_anova(&[&a, &b, &c]).unwrap();

        assert!((result.ss_between - 24.0).abs() < 1e-12);
        assert!((result.ss_within - 6.0).abs() < 1e-12);
        assert_eq!(result.df_between, 2);
        assert_eq!(result.df_within, 6);
        assert!((result.f - 12.0).abs() < 1e-12);
        // With two numerator degrees of freedom, sf(F) = (1 + 2F / 6)^-3
        assert!((result.p_unc - 0.008).abs() < 1e-6);
        assert!((result.np2 - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_anova_from_dataframe() {
        let mut df = DataFrame::new();
        df.add_float_column("y", vec![4.0, 6.0, 5.0, 7.0, 6.0, 8.0, f64::NAN])
            .unwrap();
        df.add_string_column("g", vec!["a", "b", "a", "b", "a", "b", "a"])
            .unwrap();

        let result = anova(&df, "y", "g").unwrap();
        assert_eq!(result.source, "g");
        assert_eq!(result.df_between, 1);
        assert_eq!(result.df_within, 4);
    }

    #[test]
    fn test_anova_errors() {
        let a = [1.0, 2.0];
        assert!(one_way_anova(&[&a]).is_err());
        assert!(one_way_anova(&[&a, &[]]).is_err());
        assert!(one_way_anova(&[&[1.0], &[2.0]]).is_err());
    }
}
