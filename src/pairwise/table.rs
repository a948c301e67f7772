//! Result rows of the pairwise procedures
//!
//! Field names follow the usual column names of a post-hoc table (`p-unc`,
//! `p-corr`, `BF10`, ...) when serialized.

use serde::{Deserialize, Serialize};

use crate::core::column::Column;
use crate::core::error::Result;
use crate::dataframe::DataFrame;
use crate::stats::effsize::EffsizeKind;
use crate::stats::hypothesis::Tail;
use crate::stats::multicomp::PAdjust;

/// Statistic reported by a pairwise test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    /// Student or Welch t statistic
    #[serde(rename = "T")]
    T,
    /// Mann-Whitney U statistic
    #[serde(rename = "U-val")]
    U,
    /// Wilcoxon signed-rank statistic
    #[serde(rename = "W-val")]
    W,
}

impl StatKind {
    /// Column header of the statistic
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::T => "T",
            StatKind::U => "U-val",
            StatKind::W => "W-val",
        }
    }
}

/// One comparison of [`pairwise_ttests`](super::pairwise_ttests)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseTestRow {
    /// Factor being compared, or `"<within> * <between>"` for interaction rows
    #[serde(rename = "Contrast")]
    pub contrast: String,
    /// Level of the within factor (interaction rows only)
    pub level: Option<String>,
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "mean(A)")]
    pub mean_a: Option<f64>,
    #[serde(rename = "std(A)")]
    pub std_a: Option<f64>,
    #[serde(rename = "mean(B)")]
    pub mean_b: Option<f64>,
    #[serde(rename = "std(B)")]
    pub std_b: Option<f64>,
    #[serde(rename = "Paired")]
    pub paired: bool,
    #[serde(rename = "Parametric")]
    pub parametric: bool,
    pub stat_kind: StatKind,
    pub stat: f64,
    /// Degrees of freedom (t-tests only)
    pub dof: Option<f64>,
    pub tail: Tail,
    #[serde(rename = "p-unc")]
    pub p_unc: f64,
    #[serde(rename = "p-corr")]
    pub p_corr: Option<f64>,
    #[serde(rename = "p-adjust")]
    pub p_adjust: Option<PAdjust>,
    pub reject: Option<bool>,
    #[serde(rename = "BF10")]
    pub bf10: Option<f64>,
    pub efsize: Option<f64>,
    pub eftype: EffsizeKind,
}

/// One comparison of [`pairwise_tukey`](super::pairwise_tukey) or
/// [`pairwise_gameshowell`](super::pairwise_gameshowell)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TukeyRow {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "mean(A)")]
    pub mean_a: f64,
    #[serde(rename = "mean(B)")]
    pub mean_b: f64,
    pub diff: f64,
    pub se: f64,
    pub tail: Tail,
    #[serde(rename = "T")]
    pub t: f64,
    #[serde(rename = "df")]
    pub dof: f64,
    #[serde(rename = "p-tukey")]
    pub p_val: f64,
    /// Whether `p_val` is below alpha
    pub reject: bool,
    pub efsize: Option<f64>,
    pub eftype: EffsizeKind,
}

/// One column pair of [`pairwise_corr`](super::pairwise_corr)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrRow {
    #[serde(rename = "X")]
    pub x: String,
    #[serde(rename = "Y")]
    pub y: String,
    pub method: String,
    pub tail: Tail,
    pub n: usize,
    pub r: f64,
    #[serde(rename = "CI95%_lower")]
    pub ci95_lower: f64,
    #[serde(rename = "CI95%_upper")]
    pub ci95_upper: f64,
    pub r2: f64,
    pub adj_r2: f64,
    /// Fisher z transform of `r`
    pub z: f64,
    #[serde(rename = "p-unc")]
    pub p_unc: f64,
    #[serde(rename = "p-corr")]
    pub p_corr: Option<f64>,
    #[serde(rename = "p-adjust")]
    pub p_adjust: Option<PAdjust>,
    pub reject: Option<bool>,
    #[serde(rename = "BF10")]
    pub bf10: Option<f64>,
    pub power: f64,
}

fn opt(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

fn yes_no(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

/// Lay out pairwise test rows as a table
///
/// The within-level column is named `level_name` (usually the within
/// factor). Optional columns (within level, descriptives, corrected
/// p-values, BF10, effect size) are only present when at least one row
/// carries them. The statistic column is named after the statistic of the
/// first row.
pub fn rows_to_dataframe(rows: &[PairwiseTestRow], level_name: &str) -> Result<DataFrame> {
    let mut df = DataFrame::new();
    let strings = |f: &dyn Fn(&PairwiseTestRow) -> String| -> Column {
        Column::String(rows.iter().map(f).collect())
    };
    let floats = |f: &dyn Fn(&PairwiseTestRow) -> f64| -> Column {
        Column::Float64(rows.iter().map(f).collect())
    };

    df.add_column("Contrast", strings(&|r| r.contrast.clone()))?;
    if rows.iter().any(|r| r.level.is_some()) {
        df.add_column(
            level_name,
            strings(&|r| r.level.clone().unwrap_or_else(|| "-".to_string())),
        )?;
    }
    df.add_column("A", strings(&|r| r.a.clone()))?;
    df.add_column("B", strings(&|r| r.b.clone()))?;

    if rows.iter().any(|r| r.mean_a.is_some()) {
        df.add_column("mean(A)", floats(&|r| opt(r.mean_a)))?;
        df.add_column("std(A)", floats(&|r| opt(r.std_a)))?;
        df.add_column("mean(B)", floats(&|r| opt(r.mean_b)))?;
        df.add_column("std(B)", floats(&|r| opt(r.std_b)))?;
    }

    df.add_column("Paired", strings(&|r| yes_no(r.paired)))?;
    df.add_column("Parametric", strings(&|r| yes_no(r.parametric)))?;

    let stat_name = rows.first().map(|r| r.stat_kind).unwrap_or(StatKind::T);
    df.add_column(stat_name.as_str(), floats(&|r| r.stat))?;
    if rows.iter().any(|r| r.dof.is_some()) {
        df.add_column("dof", floats(&|r| opt(r.dof)))?;
    }
    df.add_column("tail", strings(&|r| r.tail.to_string()))?;
    df.add_column("p-unc", floats(&|r| r.p_unc))?;

    if rows.iter().any(|r| r.p_adjust.is_some()) {
        df.add_column("p-corr", floats(&|r| opt(r.p_corr)))?;
        df.add_column(
            "p-adjust",
            strings(&|r| r.p_adjust.map(|m| m.to_string()).unwrap_or_default()),
        )?;
        df.add_column(
            "reject",
            strings(&|r| r.reject.map(yes_no).unwrap_or_default()),
        )?;
    }

    if rows.iter().any(|r| r.bf10.is_some()) {
        df.add_column("BF10", floats(&|r| opt(r.bf10)))?;
    }

    if let Some(eftype) = rows.first().map(|r| r.eftype) {
        if eftype != EffsizeKind::None {
            df.add_column(eftype.as_str(), floats(&|r| opt(r.efsize)))?;
        }
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(level: Option<&str>, p_adjust: Option<PAdjust>) -> PairwiseTestRow {
        PairwiseTestRow {
            contrast: "Time * Group".to_string(),
            level: level.map(str::to_string),
            a: "Control".to_string(),
            b: "Meditation".to_string(),
            mean_a: None,
            std_a: None,
            mean_b: None,
            std_b: None,
            paired: false,
            parametric: true,
            stat_kind: StatKind::T,
            stat: -1.5,
            dof: Some(58.0),
            tail: Tail::TwoSided,
            p_unc: 0.14,
            p_corr: p_adjust.map(|_| 0.28),
            p_adjust,
            reject: p_adjust.map(|_| false),
            bf10: Some(0.6),
            efsize: Some(-0.38),
            eftype: EffsizeKind::Hedges,
        }
    }

    #[test]
    fn test_rows_to_dataframe_columns() {
        let rows = vec![
            row(Some("August"), Some(PAdjust::Holm)),
            row(Some("June"), Some(PAdjust::Holm)),
        ];
        let df = rows_to_dataframe(&rows, "Time").unwrap();
        assert_eq!(
            df.column_names(),
            vec![
                "Contrast", "Time", "A", "B", "Paired", "Parametric", "T", "dof", "tail", "p-unc",
                "p-corr", "p-adjust", "reject", "BF10", "hedges"
            ]
        );
        assert_eq!(df.row_count(), 2);
        assert_eq!(
            df.get_column_string_values("p-adjust").unwrap(),
            vec!["holm", "holm"]
        );
    }

    #[test]
    fn test_rows_to_dataframe_skips_empty_columns() {
        let df = rows_to_dataframe(&[row(None, None)], "Time").unwrap();
        assert!(!df.contains_column("Time"));
        assert!(!df.contains_column("p-corr"));
        assert!(df.contains_column("BF10"));
    }
}
