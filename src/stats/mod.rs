//! Statistics Module
//!
//! The statistical core behind the pairwise procedures: parametric and
//! rank-based two-sample tests, one-way ANOVA, correlation coefficients,
//! effect sizes, Bayes factors, power and multiple comparison correction.

pub mod anova;
pub mod bayes;
pub mod correlation;
pub mod descriptive;
pub mod distributions;
pub mod effsize;
pub mod hypothesis;
pub mod multicomp;
pub mod nonparametric;
pub mod power;
pub mod quadrature;

pub use anova::{anova, one_way_anova, AnovaResult};
pub use bayes::{bayesfactor_pearson, bayesfactor_ttest};
pub use correlation::{corr, CorrMethod, CorrResult};
pub use distributions::{Distribution, NoncentralT, StudentizedRange};
pub use effsize::{
    compute_effsize, compute_effsize_from_t, compute_effsize_one_sample, convert_effsize, EffsizeKind,
};
pub use hypothesis::{ttest, ttest_one_sample, Correction, TTestResult, Tail};
pub use multicomp::{multicomp, PAdjust};
pub use nonparametric::{mwu, wilcoxon, MannWhitneyResult, WilcoxonResult};
pub use power::{power_corr, power_ttest, power_ttest2n, TTestContrast};
