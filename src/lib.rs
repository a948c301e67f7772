// Disable specific warnings
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::excessive_precision)]

//! # posthoc
//!
//! Pairwise post-hoc statistics over a small column-oriented table:
//!
//! * [`pairwise_ttests`] for within-subject, between-subject and mixed designs
//! * [`pairwise_tukey`] and [`pairwise_gameshowell`] after a one-way ANOVA
//! * [`pairwise_corr`] between numeric columns
//!
//! with effect sizes, Bayes factors and multiple-comparison correction.
//!
//! ```
//! use posthoc::{pairwise_tukey, DataFrame, PairwiseTukeyOptions};
//!
//! let mut df = DataFrame::new();
//! df.add_float_column("y", vec![4.0, 5.0, 6.0, 6.0, 7.0, 8.0, 9.0, 9.5, 11.0])?;
//! df.add_string_column("g", vec!["a", "a", "a", "b", "b", "b", "c", "c", "c"])?;
//!
//! let rows = pairwise_tukey(&df, &PairwiseTukeyOptions::new("y", "g"))?;
//! assert_eq!(rows.len(), 3);
//! # Ok::<(), posthoc::Error>(())
//! ```

// Core module with fundamental data structures and traits
pub mod core;

pub mod config;
pub mod dataframe;
pub mod io;
pub mod pairwise;
pub mod stats;

// Re-export core types
pub use crate::core::column::{Column, ColumnType};
pub use crate::core::error::{Error, Result};
pub use dataframe::DataFrame;

pub use config::PosthocConfig;
pub use io::{read_csv, write_csv};
pub use pairwise::{
    pairwise_corr, pairwise_gameshowell, pairwise_ttests, pairwise_tukey, CorrColumns, CorrRow,
    Effects, PairwiseCorrOptions, PairwiseTTestsOptions, PairwiseTestRow, PairwiseTukeyOptions,
    StatKind, TukeyRow,
};
pub use stats::{CorrMethod, EffsizeKind, PAdjust, Tail};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
