//! Tukey HSD and Games-Howell post-hoc tests
//!
//! Both compare every pair of groups of a one-way design with the
//! studentized range distribution. Tukey pools the within-group variance of
//! the ANOVA; Games-Howell uses the variances of the two groups and Welch
//! degrees of freedom.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::table::TukeyRow;
use super::{check_alpha, combinations, factor_levels, options_from_json, require_numeric};
use crate::config::PosthocConfig;
use crate::core::error::{Error, Result};
use crate::dataframe::DataFrame;
use crate::io::write_records;
use crate::stats::anova::one_way_anova;
use crate::stats::descriptive::{drop_nan, mean, variance};
use crate::stats::distributions::{Distribution, StudentizedRange};
use crate::stats::effsize::{convert_effsize, EffsizeKind};
use crate::stats::hypothesis::Tail;

/// Options of [`pairwise_tukey`] and [`pairwise_gameshowell`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseTukeyOptions {
    /// Dependent variable
    pub dv: String,
    /// Between-subject factor
    pub between: String,
    pub alpha: f64,
    /// `two-sided` or `one-sided`
    pub tail: Tail,
    pub effsize: EffsizeKind,
    /// Write the table to this CSV file
    pub export_filename: Option<PathBuf>,
}

impl Default for PairwiseTukeyOptions {
    fn default() -> Self {
        Self {
            dv: String::new(),
            between: String::new(),
            alpha: 0.05,
            tail: Tail::TwoSided,
            effsize: EffsizeKind::Hedges,
            export_filename: None,
        }
    }
}

impl PairwiseTukeyOptions {
    pub fn new(dv: impl Into<String>, between: impl Into<String>) -> Self {
        Self {
            dv: dv.into(),
            between: between.into(),
            ..Self::default()
        }
    }

    /// Options taking their defaults from a configuration
    pub fn from_config(dv: impl Into<String>, between: impl Into<String>, config: &PosthocConfig) -> Self {
        Self {
            alpha: config.alpha,
            tail: config.tail,
            effsize: config.effsize,
            ..Self::new(dv, between)
        }
    }

    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        options_from_json(json)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_tail(mut self, tail: Tail) -> Self {
        self.tail = tail;
        self
    }

    pub fn with_effsize(mut self, effsize: EffsizeKind) -> Self {
        self.effsize = effsize;
        self
    }

    pub fn with_export_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.export_filename = Some(filename.into());
        self
    }

    fn validate(&self, data: &DataFrame) -> Result<()> {
        check_alpha(self.alpha)?;
        if matches!(self.tail, Tail::Greater | Tail::Less) {
            return Err(Error::InvalidValue(format!(
                "Tail must be 'two-sided' or 'one-sided' for studentized range tests, got '{}'",
                self.tail
            )));
        }
        require_numeric(data, &self.dv)?;
        factor_levels(data, &self.between)?;
        Ok(())
    }
}

struct Group {
    label: String,
    values: Vec<f64>,
    n: f64,
    mean: f64,
    var: f64,
}

/// Non-missing values of each group, sorted by label
fn sorted_groups(data: &DataFrame, dv: &str, between: &str) -> Result<Vec<Group>> {
    let mut groups: Vec<Group> = data
        .group_values(dv, between)?
        .into_iter()
        .map(|(label, values)| {
            let values = drop_nan(&values);
            let n = values.len() as f64;
            Group {
                label,
                n,
                mean: mean(&values),
                var: variance(&values),
                values,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.label.cmp(&b.label));

    if let Some(group) = groups.iter().find(|g| g.n < 2.0) {
        return Err(Error::InsufficientData(format!(
            "Group '{}' has fewer than two non-missing values",
            group.label
        )));
    }
    Ok(groups)
}

/// Studentized range p-value of a pairwise t statistic
fn range_pvalue(t: f64, k: usize, dof: f64, tail: Tail) -> Result<f64> {
    let dist = StudentizedRange::new(k as f64, dof)?;
    let p = dist.sf(std::f64::consts::SQRT_2 * t.abs());
    Ok(match tail {
        Tail::OneSided => 0.5 * p,
        _ => p,
    })
}

fn build_row(options: &PairwiseTukeyOptions, a: &Group, b: &Group, se: f64, dof: f64, k: usize) -> Result<TukeyRow> {
    if !(se > 0.0 && se.is_finite()) {
        return Err(Error::Computation(format!(
            "Standard error of {} vs {} is not positive ({})",
            a.label, b.label, se
        )));
    }
    let diff = a.mean - b.mean;
    let t = diff / se;
    let p_val = range_pvalue(t, k, dof, options.tail)?;

    let d = t * (1.0 / a.n + 1.0 / b.n).sqrt();
    let efsize = convert_effsize(
        d,
        EffsizeKind::Cohen,
        options.effsize,
        Some(a.values.len()),
        Some(b.values.len()),
    )?;

    Ok(TukeyRow {
        a: a.label.clone(),
        b: b.label.clone(),
        mean_a: a.mean,
        mean_b: b.mean,
        diff,
        se,
        tail: options.tail,
        t,
        dof,
        p_val,
        reject: p_val < options.alpha,
        efsize,
        eftype: options.effsize,
    })
}

fn export(rows: &[TukeyRow], options: &PairwiseTukeyOptions) -> Result<()> {
    if let Some(filename) = &options.export_filename {
        write_records(rows, filename)?;
    }
    Ok(())
}

/// Tukey honestly significant difference test
///
/// Groups are sorted by label. For groups `i < j`, the standard error is
/// `sqrt(MSw / ni + MSw / nj)` with the within-group mean square of the
/// one-way ANOVA, and the p-value is `P(Q > sqrt(2) |T|)` for the
/// studentized range with `k` groups and `N - k` degrees of freedom.
///
/// # Errors
///
/// * `InvalidValue` for a directional tail (`greater`/`less`) or a bad alpha.
/// * `InvalidInput` when `between` has fewer than two levels.
/// * `InsufficientData` when a group has fewer than two values.
/// * `Computation` when the within-group variance is zero.
pub fn pairwise_tukey(data: &DataFrame, options: &PairwiseTukeyOptions) -> Result<Vec<TukeyRow>> {
    options.validate(data)?;
    let groups = sorted_groups(data, &options.dv, &options.between)?;
    let k = groups.len();

    let slices: Vec<&[f64]> = groups.iter().map(|g| g.values.as_slice()).collect();
    let aov = one_way_anova(&slices)?;
    let ms_within = aov.ms_within;
    let dof = aov.df_within as f64;

    let rows = combinations(k)
        .into_iter()
        .map(|(i, j)| {
            let (a, b) = (&groups[i], &groups[j]);
            let se = (ms_within / a.n + ms_within / b.n).sqrt();
            build_row(options, a, b, se, dof, k)
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "Tukey HSD on {} ~ {}: {} groups, MSw = {:.4}, df = {}",
        options.dv,
        options.between,
        k,
        ms_within,
        dof
    );
    export(&rows, options)?;
    Ok(rows)
}

/// Games-Howell test
///
/// As [`pairwise_tukey`], but every pair uses its own variances:
/// `SE = sqrt(vi/ni + vj/nj)` with Welch-Satterthwaite degrees of freedom.
pub fn pairwise_gameshowell(data: &DataFrame, options: &PairwiseTukeyOptions) -> Result<Vec<TukeyRow>> {
    options.validate(data)?;
    let groups = sorted_groups(data, &options.dv, &options.between)?;
    let k = groups.len();

    let rows = combinations(k)
        .into_iter()
        .map(|(i, j)| {
            let (a, b) = (&groups[i], &groups[j]);
            let (wa, wb) = (a.var / a.n, b.var / b.n);
            let se = (wa + wb).sqrt();
            let dof = (wa + wb).powi(2) / (wa.powi(2) / (a.n - 1.0) + wb.powi(2) / (b.n - 1.0));
            build_row(options, a, b, se, dof, k)
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "Games-Howell on {} ~ {}: {} groups",
        options.dv,
        options.between,
        k
    );
    export(&rows, options)?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_groups() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_float_column(
            "y",
            vec![4.0, 5.0, 6.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 9.0, 10.0, 11.0, 12.0],
        )
        .unwrap();
        df.add_string_column(
            "g",
            vec!["b", "b", "b", "b", "a", "a", "a", "a", "c", "c", "c", "c", "c"],
        )
        .unwrap();
        df
    }

    #[test]
    fn test_tukey_sorted_pairs() {
        let rows = pairwise_tukey(&three_groups(), &PairwiseTukeyOptions::new("y", "g")).unwrap();
        let pairs: Vec<(&str, &str)> = rows.iter().map(|r| (r.a.as_str(), r.b.as_str())).collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
        assert!(rows.iter().all(|r| r.dof == 10.0));
        assert!((rows[0].diff - 2.5).abs() < 1e-12);
        assert!(rows[1].p_val < rows[0].p_val);
    }

    #[test]
    fn test_one_sided_halves_p() {
        let df = three_groups();
        let two = pairwise_tukey(&df, &PairwiseTukeyOptions::new("y", "g")).unwrap();
        let one = pairwise_tukey(&df, &PairwiseTukeyOptions::new("y", "g").with_tail(Tail::OneSided)).unwrap();
        for (a, b) in two.iter().zip(one.iter()) {
            assert!((a.p_val - 2.0 * b.p_val).abs() < 1e-12);
        }
        assert!(pairwise_tukey(&df, &PairwiseTukeyOptions::new("y", "g").with_tail(Tail::Greater)).is_err());
    }

    #[test]
    fn test_gameshowell_equal_variances() {
        // Equal sizes and variances: Games-Howell matches Tukey's standard error
        let mut df = DataFrame::new();
        df.add_float_column("y", vec![1.0, 2.0, 3.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
            .unwrap();
        df.add_string_column("g", vec!["a", "a", "a", "b", "b", "b", "c", "c", "c"])
            .unwrap();
        let options = PairwiseTukeyOptions::new("y", "g");
        let tukey = pairwise_tukey(&df, &options).unwrap();
        let gh = pairwise_gameshowell(&df, &options).unwrap();
        for (a, b) in tukey.iter().zip(gh.iter()) {
            assert!((a.se - b.se).abs() < 1e-12);
            assert!((b.dof - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_groups_are_an_error() {
        let mut df = DataFrame::new();
        df.add_float_column("y", vec![1.0, 1.0, 2.0, 2.0]).unwrap();
        df.add_string_column("g", vec!["a", "a", "b", "b"]).unwrap();
        assert!(matches!(
            pairwise_gameshowell(&df, &PairwiseTukeyOptions::new("y", "g")),
            Err(Error::Computation(_))
        ));
    }

    #[test]
    fn test_single_group_is_an_error() {
        let mut df = three_groups();
        df.fill_string_column("g", "a").unwrap();
        assert!(matches!(
            pairwise_tukey(&df, &PairwiseTukeyOptions::new("y", "g")),
            Err(Error::InvalidInput(_))
        ));
    }
}
