//! Pairwise t-tests for within, between and mixed designs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::table::{rows_to_dataframe, PairwiseTestRow, StatKind};
use super::{adjust_block, check_alpha, combinations, factor_levels, options_from_json, require_numeric};
use crate::config::PosthocConfig;
use crate::core::error::{Error, Result};
use crate::dataframe::DataFrame;
use crate::io::{export_path, write_csv};
use crate::stats::descriptive::{drop_nan, mean, nan_mean_std, remove_na};
use crate::stats::effsize::{compute_effsize, EffsizeKind};
use crate::stats::hypothesis::{ttest, Correction, Tail};
use crate::stats::multicomp::PAdjust;
use crate::stats::nonparametric::{mwu, wilcoxon};

/// Which effects of a design are tested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Effects {
    /// Between, within and interaction blocks
    #[default]
    All,
    Within,
    Between,
    Interaction,
}

impl Effects {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effects::All => "all",
            Effects::Within => "within",
            Effects::Between => "between",
            Effects::Interaction => "interaction",
        }
    }
}

impl fmt::Display for Effects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effects {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Effects::All),
            "within" => Ok(Effects::Within),
            "between" => Ok(Effects::Between),
            "interaction" => Ok(Effects::Interaction),
            other => Err(Error::InvalidValue(format!(
                "Effects must be 'all', 'within', 'between' or 'interaction', got '{}'",
                other
            ))),
        }
    }
}

/// Options of [`pairwise_ttests`]
///
/// ```
/// use posthoc::{PairwiseTTestsOptions, PAdjust, Tail};
///
/// let options = PairwiseTTestsOptions::new("Scores")
///     .with_within("Time")
///     .with_padjust(PAdjust::Holm)
///     .with_tail(Tail::OneSided);
/// assert_eq!(options.within.as_deref(), Some("Time"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseTTestsOptions {
    /// Dependent variable
    pub dv: String,
    /// Within-subject factor
    pub within: Option<String>,
    /// Between-subject factor
    pub between: Option<String>,
    /// Subject identifier used to match repeated measures
    pub subject: Option<String>,
    pub effects: Effects,
    /// Use t-tests (true) or Mann-Whitney / Wilcoxon (false)
    pub parametric: bool,
    pub alpha: f64,
    pub tail: Tail,
    pub padjust: PAdjust,
    pub effsize: EffsizeKind,
    /// Report mean and standard deviation of both samples
    pub return_desc: bool,
    /// Write the table to this CSV file
    pub export_filename: Option<PathBuf>,
}

impl Default for PairwiseTTestsOptions {
    fn default() -> Self {
        Self {
            dv: String::new(),
            within: None,
            between: None,
            subject: None,
            effects: Effects::All,
            parametric: true,
            alpha: 0.05,
            tail: Tail::TwoSided,
            padjust: PAdjust::None,
            effsize: EffsizeKind::Hedges,
            return_desc: false,
            export_filename: None,
        }
    }
}

impl PairwiseTTestsOptions {
    /// Options with default settings for the dependent variable `dv`
    pub fn new(dv: impl Into<String>) -> Self {
        Self {
            dv: dv.into(),
            ..Self::default()
        }
    }

    /// Options taking their defaults from a configuration
    pub fn from_config(dv: impl Into<String>, config: &PosthocConfig) -> Self {
        Self {
            dv: dv.into(),
            parametric: config.parametric,
            alpha: config.alpha,
            tail: config.tail,
            padjust: config.padjust,
            effsize: config.effsize,
            return_desc: config.return_desc,
            ..Self::default()
        }
    }

    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        options_from_json(json)
    }

    pub fn with_within(mut self, within: impl Into<String>) -> Self {
        self.within = Some(within.into());
        self
    }

    pub fn with_between(mut self, between: impl Into<String>) -> Self {
        self.between = Some(between.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_parametric(mut self, parametric: bool) -> Self {
        self.parametric = parametric;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_tail(mut self, tail: Tail) -> Self {
        self.tail = tail;
        self
    }

    pub fn with_padjust(mut self, padjust: PAdjust) -> Self {
        self.padjust = padjust;
        self
    }

    pub fn with_effsize(mut self, effsize: EffsizeKind) -> Self {
        self.effsize = effsize;
        self
    }

    pub fn with_return_desc(mut self, return_desc: bool) -> Self {
        self.return_desc = return_desc;
        self
    }

    pub fn with_export_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.export_filename = Some(filename.into());
        self
    }
}

/// A labelled sample entering one comparison
struct Sample<'a> {
    label: &'a str,
    values: &'a [f64],
}

/// Pairwise t-tests (or rank tests) between the levels of the factors
///
/// Rows come in blocks: between, within, then interaction when `effects`
/// is `all`. The p-values of each block with more than one row are adjusted
/// with `padjust`.
///
/// # Errors
///
/// * `InvalidValue` for an alpha outside (0, 1).
/// * `ColumnNotFound` / `ColumnTypeMismatch` when `dv` is missing or not
///   numeric, or a factor column is missing.
/// * `InvalidInput` when neither factor is given or a factor has fewer than
///   two levels.
pub fn pairwise_ttests(data: &DataFrame, options: &PairwiseTTestsOptions) -> Result<Vec<PairwiseTestRow>> {
    check_alpha(options.alpha)?;
    require_numeric(data, &options.dv)?;
    for factor in [&options.within, &options.between, &options.subject]
        .into_iter()
        .flatten()
    {
        data.column(factor)?;
    }

    let effects = match (&options.within, &options.between) {
        (None, None) => {
            return Err(Error::InvalidInput(
                "At least one of 'within' or 'between' must be specified".into(),
            ))
        }
        (Some(_), None) => Effects::Within,
        (None, Some(_)) => Effects::Between,
        (Some(_), Some(_)) => options.effects,
    };

    let mut rows = Vec::new();
    if matches!(effects, Effects::All | Effects::Between) {
        rows.extend(between_block(data, options)?);
    }
    if matches!(effects, Effects::All | Effects::Within) {
        rows.extend(within_block(data, options)?);
    }
    if matches!(effects, Effects::All | Effects::Interaction) {
        rows.extend(interaction_block(data, options)?);
    }

    if let Some(filename) = &options.export_filename {
        let level_name = options.within.as_deref().unwrap_or("Level");
        let table = rows_to_dataframe(&rows, level_name)?;
        let path = export_path(filename);
        write_csv(&table, &path)?;
        log::info!("Wrote {} pairwise tests to {}", rows.len(), path.display());
    }

    Ok(rows)
}

fn required<'a>(factor: &'a Option<String>, name: &str) -> Result<&'a str> {
    factor
        .as_deref()
        .ok_or_else(|| Error::InvalidInput(format!("'{}' factor is required", name)))
}

fn within_block(data: &DataFrame, options: &PairwiseTTestsOptions) -> Result<Vec<PairwiseTestRow>> {
    let within = required(&options.within, "within")?;
    let levels = factor_levels(data, within)?;

    let mut rows = Vec::new();
    match &options.subject {
        Some(subject) => {
            let by_level = subject_means(data, &options.dv, subject, within)?;
            for (i, j) in combinations(levels.len()) {
                let (x, y) = match_subjects(&by_level[&levels[i]], &by_level[&levels[j]]);
                rows.push(compare(
                    options,
                    within,
                    None,
                    Sample { label: &levels[i], values: &x },
                    Sample { label: &levels[j], values: &y },
                    true,
                )?);
            }
        }
        None => {
            let groups: HashMap<String, Vec<f64>> =
                data.group_values(&options.dv, within)?.into_iter().collect();
            for (i, j) in combinations(levels.len()) {
                rows.push(compare(
                    options,
                    within,
                    None,
                    Sample { label: &levels[i], values: &groups[&levels[i]] },
                    Sample { label: &levels[j], values: &groups[&levels[j]] },
                    true,
                )?);
            }
        }
    }

    adjust(&mut rows, options)?;
    log::debug!("Within block on '{}': {} comparisons", within, rows.len());
    Ok(rows)
}

fn between_block(data: &DataFrame, options: &PairwiseTTestsOptions) -> Result<Vec<PairwiseTestRow>> {
    let between = required(&options.between, "between")?;
    let levels = factor_levels(data, between)?;

    // Repeated measures are averaged per subject before comparing groups
    let groups: HashMap<String, Vec<f64>> = match (&options.within, &options.subject) {
        (Some(_), Some(subject)) => subject_means(data, &options.dv, subject, between)?
            .into_iter()
            .map(|(level, subjects)| (level, subjects.into_iter().map(|(_, v)| v).collect()))
            .collect(),
        _ => data.group_values(&options.dv, between)?.into_iter().collect(),
    };

    let mut rows = Vec::new();
    for (i, j) in combinations(levels.len()) {
        rows.push(compare(
            options,
            between,
            None,
            Sample { label: &levels[i], values: &groups[&levels[i]] },
            Sample { label: &levels[j], values: &groups[&levels[j]] },
            false,
        )?);
    }

    adjust(&mut rows, options)?;
    log::debug!("Between block on '{}': {} comparisons", between, rows.len());
    Ok(rows)
}

fn interaction_block(data: &DataFrame, options: &PairwiseTTestsOptions) -> Result<Vec<PairwiseTestRow>> {
    let within = required(&options.within, "within")?;
    let between = required(&options.between, "between")?;
    let within_levels = factor_levels(data, within)?;
    let between_levels = factor_levels(data, between)?;
    let contrast = format!("{} * {}", within, between);

    let labels = data.get_column_string_values(within)?;
    let mut rows = Vec::new();
    for level in &within_levels {
        let subset = data.filter_rows(|row| &labels[row] == level)?;
        let groups: HashMap<String, Vec<f64>> =
            subset.group_values(&options.dv, between)?.into_iter().collect();
        // Cells of an unbalanced design may be empty at some levels
        let cell = |label: &String| {
            groups
                .get(label)
                .filter(|values| values.iter().filter(|v| !v.is_nan()).count() >= 2)
        };
        for (i, j) in combinations(between_levels.len()) {
            let a = &between_levels[i];
            let b = &between_levels[j];
            let (Some(x), Some(y)) = (cell(a), cell(b)) else {
                log::warn!(
                    "Skipping {} vs {} at {} = {}: fewer than two observations",
                    a,
                    b,
                    within,
                    level
                );
                continue;
            };
            rows.push(compare(
                options,
                &contrast,
                Some(level),
                Sample { label: a, values: x },
                Sample { label: b, values: y },
                false,
            )?);
        }
    }

    adjust(&mut rows, options)?;
    log::debug!("Interaction block '{}': {} comparisons", contrast, rows.len());
    Ok(rows)
}

/// Mean `dv` of every subject at each level of `factor`
///
/// Levels and subjects keep their order of first appearance. Missing values
/// are ignored; a subject with no valid value at a level is left out of it.
fn subject_means(
    data: &DataFrame,
    dv: &str,
    subject: &str,
    factor: &str,
) -> Result<HashMap<String, Vec<(String, f64)>>> {
    let values = data.get_column_numeric_values(dv)?;
    let subjects = data.get_column_string_values(subject)?;
    let levels = data.get_column_string_values(factor)?;

    let mut cells: HashMap<String, (Vec<String>, HashMap<String, Vec<f64>>)> = HashMap::new();
    for ((value, subject), level) in values.into_iter().zip(subjects).zip(levels) {
        let (order, by_subject) = cells.entry(level).or_default();
        if !by_subject.contains_key(&subject) {
            order.push(subject.clone());
        }
        by_subject.entry(subject).or_default().push(value);
    }

    Ok(cells
        .into_iter()
        .map(|(level, (order, by_subject))| {
            let means = order
                .into_iter()
                .filter_map(|subject| {
                    let clean = drop_nan(&by_subject[&subject]);
                    (!clean.is_empty()).then(|| (subject, mean(&clean)))
                })
                .collect();
            (level, means)
        })
        .collect())
}

/// Values of the subjects measured at both levels, in the order of the first
fn match_subjects(a: &[(String, f64)], b: &[(String, f64)]) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<&str, f64> = b.iter().map(|(s, v)| (s.as_str(), *v)).collect();
    a.iter()
        .filter_map(|(s, x)| lookup.get(s.as_str()).map(|y| (*x, *y)))
        .unzip()
}

fn compare(
    options: &PairwiseTTestsOptions,
    contrast: &str,
    level: Option<&str>,
    a: Sample<'_>,
    b: Sample<'_>,
    paired: bool,
) -> Result<PairwiseTestRow> {
    let (x, y) = remove_na(a.values, b.values, paired);
    let paired = if paired && x.len() != y.len() {
        log::warn!(
            "{} vs {}: samples have unequal sizes ({} vs {}), using an unpaired test",
            a.label,
            b.label,
            x.len(),
            y.len()
        );
        false
    } else {
        paired
    };

    let (stat_kind, stat, dof, p_unc, bf10) = if options.parametric {
        let res = ttest(&x, &y, paired, options.tail, Correction::Auto)?;
        (StatKind::T, res.t, Some(res.dof), res.p_val, Some(res.bf10))
    } else if paired {
        let res = wilcoxon(&x, &y, options.tail)?;
        (StatKind::W, res.w_val, None, res.p_val, None)
    } else {
        let res = mwu(&x, &y, options.tail)?;
        (StatKind::U, res.u_val, None, res.p_val, None)
    };

    let efsize = compute_effsize(&x, &y, paired, options.effsize)?;

    let (mean_a, std_a, mean_b, std_b) = if options.return_desc {
        let (ma, sa) = nan_mean_std(&x);
        let (mb, sb) = nan_mean_std(&y);
        (Some(ma), Some(sa), Some(mb), Some(sb))
    } else {
        (None, None, None, None)
    };

    Ok(PairwiseTestRow {
        contrast: contrast.to_string(),
        level: level.map(str::to_string),
        a: a.label.to_string(),
        b: b.label.to_string(),
        mean_a,
        std_a,
        mean_b,
        std_b,
        paired,
        parametric: options.parametric,
        stat_kind,
        stat,
        dof,
        tail: options.tail,
        p_unc,
        p_corr: None,
        p_adjust: None,
        reject: None,
        bf10,
        efsize,
        eftype: options.effsize,
    })
}

fn adjust(rows: &mut [PairwiseTestRow], options: &PairwiseTTestsOptions) -> Result<()> {
    let p_values: Vec<f64> = rows.iter().map(|r| r.p_unc).collect();
    if let Some((reject, corrected)) = adjust_block(&p_values, options.alpha, options.padjust)? {
        for ((row, reject), p_corr) in rows.iter_mut().zip(reject).zip(corrected) {
            row.p_corr = Some(p_corr);
            row.p_adjust = Some(options.padjust);
            row.reject = Some(reject);
        }
    }
    Ok(())
}
