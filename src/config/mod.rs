//! Configuration management for posthoc
//!
//! This module provides default settings for the pairwise procedures with
//! support for:
//! - Environment variables
//! - YAML/TOML configuration files
//! - Configuration validation

use crate::core::error::{Error, Result};
use crate::stats::correlation::CorrMethod;
use crate::stats::effsize::EffsizeKind;
use crate::stats::hypothesis::Tail;
use crate::stats::multicomp::PAdjust;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod loader;
pub mod validation;

/// Main configuration structure for posthoc
///
/// Missing keys in a configuration file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosthocConfig {
    /// Significance level used for the rejection decisions
    pub alpha: f64,
    /// Default alternative hypothesis
    pub tail: Tail,
    /// Default p-value adjustment
    pub padjust: PAdjust,
    /// Default effect size reported by the pairwise t-tests
    pub effsize: EffsizeKind,
    /// Default method of the pairwise correlations
    pub correlation_method: CorrMethod,
    /// Use parametric tests by default
    pub parametric: bool,
    /// Report descriptive statistics by default
    pub return_desc: bool,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum log level (off, error, warn, info, debug, trace)
    pub level: String,
}

impl Default for PosthocConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            tail: Tail::TwoSided,
            padjust: PAdjust::None,
            effsize: EffsizeKind::Hedges,
            correlation_method: CorrMethod::Pearson,
            parametric: true,
            return_desc: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Level filter matching the configured level
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level.parse().map_err(|_| {
            Error::ConfigurationError(format!("Invalid log level: '{}'", self.level))
        })
    }
}

impl PosthocConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_from_file(path.as_ref())
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        loader::load_from_yaml(yaml)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        loader::load_from_toml(toml)
    }

    /// Load configuration with precedence: defaults -> file -> env
    pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        loader::load_with_precedence(config_file)
    }

    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        loader::save_to_file(self, path.as_ref())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to YAML: {}", e))
        })
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to TOML: {}", e))
        })
    }

    /// Set the global maximum log level from the logging section
    ///
    /// Only the level filter of the `log` facade is changed; installing a
    /// logger is left to the application.
    pub fn apply_log_level(&self) -> Result<()> {
        log::set_max_level(self.logging.level_filter()?);
        Ok(())
    }
}
