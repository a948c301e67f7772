//! Pairwise post-hoc comparisons
//!
//! * [`pairwise_ttests`]: t-tests (or Mann-Whitney / Wilcoxon) between every
//!   pair of levels of a within-subject factor, a between-subject factor, or
//!   both and their interaction.
//! * [`pairwise_tukey`] and [`pairwise_gameshowell`]: post-hoc tests after a
//!   one-way ANOVA, based on the studentized range distribution.
//! * [`pairwise_corr`]: correlation between every pair of numeric columns.
//!
//! Every procedure returns one row per comparison. Rows serialize with the
//! conventional column names (`p-unc`, `p-corr`, `BF10`, ...) and can be
//! exported to CSV.

pub mod corr;
pub mod table;
pub mod ttests;
pub mod tukey;

pub use corr::{pairwise_corr, CorrColumns, PairwiseCorrOptions};
pub use table::{CorrRow, PairwiseTestRow, StatKind, TukeyRow};
pub use ttests::{pairwise_ttests, Effects, PairwiseTTestsOptions};
pub use tukey::{pairwise_gameshowell, pairwise_tukey, PairwiseTukeyOptions};

use crate::core::error::{Error, Result};
use crate::dataframe::DataFrame;
use crate::stats::multicomp::{multicomp, PAdjust};

/// Index pairs `(i, j)` with `i < j` over `n` items, in lexical order
pub(crate) fn combinations(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect()
}

/// Check that `column` exists and holds numbers
pub(crate) fn require_numeric(data: &DataFrame, column: &str) -> Result<()> {
    data.column(column)?.as_f64(column).map(|_| ())
}

/// Check that a factor has at least two levels and return them
pub(crate) fn factor_levels(data: &DataFrame, factor: &str) -> Result<Vec<String>> {
    let levels = data.unique_values(factor)?;
    if levels.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "Column '{}' must have at least two unique values",
            factor
        )));
    }
    Ok(levels)
}

/// Check a significance level
pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(Error::InvalidValue(format!(
            "alpha must be a number strictly between 0 and 1, got {}",
            alpha
        )));
    }
    Ok(())
}

/// Parse an options document, reporting every deserialization failure
/// (unknown tail, non-numeric alpha, ...) as a value error
pub(crate) fn options_from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| Error::InvalidValue(format!("Invalid options: {}", e)))
}

/// Corrected p-values and rejection decisions for a block of comparisons
///
/// Blocks with a single comparison or without a correction method are left
/// uncorrected.
pub(crate) fn adjust_block(
    p_values: &[f64],
    alpha: f64,
    padjust: PAdjust,
) -> Result<Option<(Vec<bool>, Vec<f64>)>> {
    if padjust == PAdjust::None || p_values.len() < 2 {
        return Ok(None);
    }
    multicomp(p_values, alpha, padjust).map(Some)
}
