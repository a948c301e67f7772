//! Configuration validation utilities

use super::*;
use crate::core::error::{Error, Result};

/// Validate the entire configuration
pub fn validate_config(config: &PosthocConfig) -> Result<()> {
    validate_alpha(config.alpha)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Validate a significance level
pub fn validate_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(Error::ConfigurationError(format!(
            "alpha must be a number strictly between 0 and 1, got {}",
            alpha
        )));
    }
    Ok(())
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    config.level_filter().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_alpha() {
        assert!(validate_alpha(0.05).is_ok());
        for alpha in [0.0, 1.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(validate_alpha(alpha).is_err(), "alpha = {}", alpha);
        }
    }

    #[test]
    fn test_validate_logging() {
        let mut logging = LoggingConfig::default();
        assert!(validate_logging_config(&logging).is_ok());
        logging.level = "TRACE".to_string();
        assert!(validate_logging_config(&logging).is_ok());
        logging.level = "verbose".to_string();
        assert!(validate_logging_config(&logging).is_err());
    }
}
