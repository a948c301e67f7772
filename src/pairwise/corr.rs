//! Pairwise correlations between numeric columns

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::table::CorrRow;
use super::{adjust_block, check_alpha, combinations, options_from_json};
use crate::config::PosthocConfig;
use crate::core::error::{Error, Result};
use crate::dataframe::DataFrame;
use crate::io::write_records;
use crate::stats::correlation::{corr, CorrMethod};
use crate::stats::hypothesis::Tail;
use crate::stats::multicomp::PAdjust;

/// Column pairs tested by [`pairwise_corr`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrColumns {
    /// Every pair of numeric columns
    #[default]
    All,
    /// Every pair within a subset of columns
    Subset(Vec<String>),
    /// Every column of the first list against every column of the second
    Product(Vec<String>, Vec<String>),
}

/// Options of [`pairwise_corr`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseCorrOptions {
    pub columns: CorrColumns,
    pub tail: Tail,
    pub method: CorrMethod,
    pub padjust: PAdjust,
    /// Level of the rejection decisions when p-values are adjusted
    pub alpha: f64,
    /// Write the table to this CSV file
    pub export_filename: Option<PathBuf>,
}

impl Default for PairwiseCorrOptions {
    fn default() -> Self {
        Self {
            columns: CorrColumns::All,
            tail: Tail::TwoSided,
            method: CorrMethod::Pearson,
            padjust: PAdjust::None,
            alpha: 0.05,
            export_filename: None,
        }
    }
}

impl PairwiseCorrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taking their defaults from a configuration
    pub fn from_config(config: &PosthocConfig) -> Self {
        Self {
            tail: config.tail,
            method: config.correlation_method,
            padjust: config.padjust,
            alpha: config.alpha,
            ..Self::default()
        }
    }

    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        options_from_json(json)
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = CorrColumns::Subset(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_column_product<S: Into<String>, T: Into<String>>(
        mut self,
        left: impl IntoIterator<Item = S>,
        right: impl IntoIterator<Item = T>,
    ) -> Self {
        self.columns = CorrColumns::Product(
            left.into_iter().map(Into::into).collect(),
            right.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn with_tail(mut self, tail: Tail) -> Self {
        self.tail = tail;
        self
    }

    pub fn with_method(mut self, method: CorrMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_padjust(mut self, padjust: PAdjust) -> Self {
        self.padjust = padjust;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_export_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.export_filename = Some(filename.into());
        self
    }
}

/// Keep the numeric columns of `names`; unknown names are an error
fn numeric_columns(data: &DataFrame, names: &[String]) -> Result<Vec<String>> {
    let mut kept = Vec::with_capacity(names.len());
    for name in names {
        data.column(name)?;
        if data.is_numeric_column(name) {
            if !kept.contains(name) {
                kept.push(name.clone());
            }
        } else {
            log::warn!("Column '{}' is not numeric and is skipped", name);
        }
    }
    Ok(kept)
}

fn column_pairs(data: &DataFrame, columns: &CorrColumns) -> Result<Vec<(String, String)>> {
    let pairs = match columns {
        CorrColumns::All | CorrColumns::Subset(_) => {
            let keys = match columns {
                CorrColumns::Subset(names) => numeric_columns(data, names)?,
                _ => data.numeric_column_names(),
            };
            if keys.len() < 2 {
                return Err(Error::InvalidInput(format!(
                    "At least two numeric columns are required, got {}",
                    keys.len()
                )));
            }
            combinations(keys.len())
                .into_iter()
                .map(|(i, j)| (keys[i].clone(), keys[j].clone()))
                .collect::<Vec<_>>()
        }
        CorrColumns::Product(left, right) => {
            let left = numeric_columns(data, left)?;
            let right = numeric_columns(data, right)?;
            left.iter()
                .flat_map(|x| right.iter().filter(move |y| *y != x).map(move |y| (x.clone(), y.clone())))
                .collect()
        }
    };

    if pairs.is_empty() {
        return Err(Error::InvalidInput(
            "No pair of distinct numeric columns to correlate".into(),
        ));
    }
    Ok(pairs)
}

/// Correlation between every selected pair of numeric columns
///
/// Rows with a missing value in either column of a pair are dropped for that
/// pair only. Pairs are computed in parallel; the output keeps the pair
/// order. The p-values are adjusted across all pairs with `padjust`.
///
/// # Errors
///
/// * `ColumnNotFound` for an unknown column name.
/// * `InvalidInput` when fewer than two numeric columns are selected.
/// * `InsufficientData` when a pair has fewer than three complete rows.
pub fn pairwise_corr(data: &DataFrame, options: &PairwiseCorrOptions) -> Result<Vec<CorrRow>> {
    check_alpha(options.alpha)?;
    let pairs = column_pairs(data, &options.columns)?;

    let mut rows = pairs
        .par_iter()
        .map(|(x, y)| -> Result<CorrRow> {
            let xs = data.column(x)?.as_f64(x)?;
            let ys = data.column(y)?.as_f64(y)?;
            let res = corr(xs, ys, options.tail, options.method)?;
            Ok(CorrRow {
                x: x.clone(),
                y: y.clone(),
                method: options.method.to_string(),
                tail: options.tail,
                n: res.n,
                r: res.r,
                ci95_lower: res.ci95.0,
                ci95_upper: res.ci95.1,
                r2: res.r2,
                adj_r2: res.adj_r2,
                z: res.r.atanh(),
                p_unc: res.p_val,
                p_corr: None,
                p_adjust: None,
                reject: None,
                bf10: res.bf10,
                power: res.power,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let p_values: Vec<f64> = rows.iter().map(|r| r.p_unc).collect();
    if let Some((reject, corrected)) = adjust_block(&p_values, options.alpha, options.padjust)? {
        for ((row, reject), p_corr) in rows.iter_mut().zip(reject).zip(corrected) {
            row.p_corr = Some(p_corr);
            row.p_adjust = Some(options.padjust);
            row.reject = Some(reject);
        }
    }

    log::debug!(
        "Pairwise {} correlations: {} pairs",
        options.method,
        rows.len()
    );

    if let Some(filename) = &options.export_filename {
        write_records(&rows, filename)?;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> DataFrame {
        let mut df = DataFrame::new();
        df.add_float_column("a", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        df.add_float_column("b", vec![2.0, 4.0, 5.0, 4.0, 5.0, 7.0]).unwrap();
        df.add_string_column("label", vec!["x"; 6]).unwrap();
        df.add_float_column("c", vec![6.0, 5.0, f64::NAN, 3.0, 2.5, 1.0]).unwrap();
        df
    }

    #[test]
    fn test_all_numeric_pairs() {
        let rows = pairwise_corr(&data(), &PairwiseCorrOptions::new()).unwrap();
        let pairs: Vec<(&str, &str)> = rows.iter().map(|r| (r.x.as_str(), r.y.as_str())).collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
        // Missing value dropped for the pairs involving c
        assert_eq!(rows[0].n, 6);
        assert_eq!(rows[1].n, 5);
        assert!(rows[1].r < -0.99);
        assert!(rows.iter().all(|r| r.bf10.is_some() && r.p_corr.is_none()));
    }

    #[test]
    fn test_subset_and_adjustment() {
        let options = PairwiseCorrOptions::new()
            .with_columns(["a", "b", "label"])
            .with_padjust(PAdjust::Bonf);
        let rows = pairwise_corr(&data(), &options).unwrap();
        // A single pair is left unadjusted
        assert_eq!(rows.len(), 1);
        assert!(rows[0].p_corr.is_none());

        let options = PairwiseCorrOptions::new()
            .with_method(CorrMethod::Spearman)
            .with_padjust(PAdjust::Bonf);
        let rows = pairwise_corr(&data(), &options).unwrap();
        for row in &rows {
            assert_eq!(row.p_corr, Some((3.0 * row.p_unc).min(1.0)));
            assert!(row.bf10.is_none());
        }
    }

    #[test]
    fn test_column_product() {
        let options = PairwiseCorrOptions::new().with_column_product(["a"], ["b", "c"]);
        let rows = pairwise_corr(&data(), &options).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.x == "a"));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            pairwise_corr(&data(), &PairwiseCorrOptions::new().with_columns(["a"])),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pairwise_corr(&data(), &PairwiseCorrOptions::new().with_columns(["a", "zzz"])),
            Err(Error::ColumnNotFound(_))
        ));
        assert!(PairwiseCorrOptions::from_json(r#"{"tail": "wrong"}"#).is_err());
        assert!(PairwiseCorrOptions::from_json(r#"{"method": "spearman", "columns": {"subset": ["X", "Y"]}}"#).is_ok());
    }
}
