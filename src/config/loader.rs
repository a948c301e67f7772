//! Configuration loading utilities
//!
//! This module handles loading configuration from various sources with proper
//! precedence and validation.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Parse an environment variable into `T`, if set
fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Override `config` with the `POSTHOC_*` environment variables that are set
pub fn apply_env_overrides(config: &mut PosthocConfig) -> Result<()> {
    if let Some(alpha) = env_value("POSTHOC_ALPHA")? {
        config.alpha = alpha;
    }

    if let Some(tail) = env_value("POSTHOC_TAIL")? {
        config.tail = tail;
    }

    if let Some(padjust) = env_value("POSTHOC_PADJUST")? {
        config.padjust = padjust;
    }

    if let Some(effsize) = env_value("POSTHOC_EFFSIZE")? {
        config.effsize = effsize;
    }

    if let Some(method) = env_value("POSTHOC_METHOD")? {
        config.correlation_method = method;
    }

    if let Some(parametric) = env_value("POSTHOC_PARAMETRIC")? {
        config.parametric = parametric;
    }

    if let Some(return_desc) = env_value("POSTHOC_RETURN_DESC")? {
        config.return_desc = return_desc;
    }

    // Logging configuration
    if let Ok(log_level) = env::var("POSTHOC_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
        config.logging.level = log_level;
    }

    Ok(())
}

/// Load configuration from environment variables
pub fn load_from_env() -> Result<PosthocConfig> {
    let mut config = PosthocConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file (YAML or TOML based on extension)
pub fn load_from_file(path: &Path) -> Result<PosthocConfig> {
    if !path.exists() {
        return Err(Error::ConfigurationError(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => load_from_yaml(&contents),
        Some("toml") => load_from_toml(&contents),
        Some(ext) => Err(Error::ConfigurationError(format!(
            "Unsupported config file format: {}",
            ext
        ))),
        None => {
            // Try to parse as YAML first, then TOML
            load_from_yaml(&contents).or_else(|_| load_from_toml(&contents))
        }
    }
}

/// Load configuration from YAML string
pub fn load_from_yaml(yaml: &str) -> Result<PosthocConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse YAML config: {}", e)))
}

/// Load configuration from TOML string
pub fn load_from_toml(toml: &str) -> Result<PosthocConfig> {
    toml::from_str(toml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse TOML config: {}", e)))
}

/// Load configuration with precedence: defaults -> file -> environment
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<PosthocConfig> {
    // Keys absent from the file keep their defaults
    let mut config = match config_file {
        Some(file_path) => load_from_file(file_path.as_ref())?,
        None => PosthocConfig::default(),
    };

    // Environment has the highest precedence
    apply_env_overrides(&mut config)?;

    // Validate final configuration
    config.validate()?;

    log::debug!(
        "Loaded configuration: alpha = {}, tail = {}, padjust = {}",
        config.alpha,
        config.tail,
        config.padjust
    );
    Ok(config)
}

/// Save configuration to a file
pub fn save_to_file(config: &PosthocConfig, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => config.to_yaml()?,
        Some("toml") => config.to_toml()?,
        Some(ext) => {
            return Err(Error::ConfigurationError(format!(
                "Unsupported config file format: {}",
                ext
            )))
        }
        None => config.to_yaml()?, // Default to YAML
    };

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    fs::write(path, contents).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Get configuration file paths in order of precedence
pub fn get_config_file_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![
        "posthoc.yml".into(),
        "posthoc.yaml".into(),
        "posthoc.toml".into(),
    ];

    // User config directory
    if let Some(config_dir) = dirs::config_dir() {
        let posthoc_dir = config_dir.join("posthoc");
        paths.push(posthoc_dir.join("config.yml"));
        paths.push(posthoc_dir.join("config.yaml"));
        paths.push(posthoc_dir.join("config.toml"));
    }

    // Environment variable override
    if let Ok(config_path) = env::var("POSTHOC_CONFIG_FILE") {
        paths.insert(0, config_path.into());
    }

    paths
}

/// Auto-discover and load configuration file
pub fn auto_load() -> Result<PosthocConfig> {
    for path in get_config_file_paths() {
        if path.exists() {
            return load_with_precedence(Some(path));
        }
    }

    // No config file found, load from environment and defaults
    load_with_precedence::<&Path>(None)
}
