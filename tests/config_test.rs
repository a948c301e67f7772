//! Configuration system tests

use posthoc::config::loader::*;
use posthoc::config::validation::*;
use posthoc::config::*;
use posthoc::{CorrMethod, EffsizeKind, PAdjust, PairwiseCorrOptions, Tail};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = PosthocConfig::default();

    assert_eq!(config.alpha, 0.05);
    assert_eq!(config.tail, Tail::TwoSided);
    assert_eq!(config.padjust, PAdjust::None);
    assert_eq!(config.effsize, EffsizeKind::Hedges);
    assert!(config.parametric);
    assert_eq!(config.logging.level, "warn");

    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_serialization() {
    let config = PosthocConfig::default();

    // Test YAML serialization
    let yaml = config.to_yaml().unwrap();
    assert!(yaml.contains("alpha: 0.05"));
    assert!(yaml.contains("tail: two-sided"));
    assert!(yaml.contains("logging:"));
    assert_eq!(PosthocConfig::from_yaml(&yaml).unwrap(), config);

    // Test TOML serialization
    let toml = config.to_toml().unwrap();
    assert!(toml.contains("padjust = \"none\""));
    assert!(toml.contains("[logging]"));
    assert_eq!(PosthocConfig::from_toml(&toml).unwrap(), config);
}

#[test]
fn test_config_validation() {
    let mut config = PosthocConfig::default();
    assert!(validate_config(&config).is_ok());

    config.alpha = 1.5;
    assert!(validate_config(&config).is_err());

    config.alpha = 0.01;
    config.logging.level = "loud".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_invalid_values_in_documents() {
    for yaml in ["tail: wrong", "alpha: '.05'", "padjust: tukey", "correlation_method: distance"] {
        let err = PosthocConfig::from_yaml(yaml).unwrap_err();
        assert!(err.is_value_error(), "{}", yaml);
    }
}

#[test]
fn test_file_round_trip_and_options() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("posthoc.yaml");
    fs::write(
        &path,
        "alpha: 0.1\ntail: one-sided\npadjust: bonferroni\ncorrelation_method: kendall\n",
    )
    .unwrap();

    let config = load_from_file(&path).unwrap();
    assert_eq!(config.padjust, PAdjust::Bonf);
    assert_eq!(config.correlation_method, CorrMethod::Kendall);

    let options = PairwiseCorrOptions::from_config(&config);
    assert_eq!(options.method, CorrMethod::Kendall);
    assert_eq!(options.tail, Tail::OneSided);
    assert_eq!(options.alpha, 0.1);

    let copy = dir.path().join("copy.toml");
    config.save_to_file(&copy).unwrap();
    assert_eq!(PosthocConfig::from_file(&copy).unwrap(), config);
}

#[test]
fn test_config_file_paths() {
    let paths = get_config_file_paths();
    assert!(paths.iter().any(|p| p.ends_with("posthoc.yml")));
    assert!(paths.iter().any(|p| p.ends_with("posthoc.toml")));
}

#[test]
fn test_apply_log_level() {
    let mut config = PosthocConfig::default();
    config.logging.level = "debug".to_string();
    config.apply_log_level().unwrap();
    assert_eq!(log::max_level(), log::LevelFilter::Debug);
}
