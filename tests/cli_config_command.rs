//! Integration tests for the `medrelay config` template
//!
//! Verifies that the generated template round-trips through the config loader.

use medrelay::cli::generate_config_template;
use medrelay::config::{Config, ConfigSource};
use std::fs;
use tempfile::TempDir;

fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

#[test]
fn test_generated_template_creates_valid_config_file() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");

    fs::write(&config_path, generate_config_template()).expect("Failed to write template");

    let config =
        Config::from_file(&config_path).expect("Generated template should load as valid Config");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8000);
    assert!(config.server.cors_allowed_origins.is_empty());
    assert_eq!(config.upstream.api_key_env, "GROQ_API_KEY");
    assert_eq!(config.upstream.timeout_seconds, 30);
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn test_template_matches_builtin_defaults() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, generate_config_template()).unwrap();

    let from_template = Config::from_file(&config_path).unwrap();
    let defaults = Config::default();

    assert_eq!(from_template.upstream.api_url, defaults.upstream.api_url);
    assert_eq!(from_template.upstream.model, defaults.upstream.model);
    assert_eq!(from_template.upstream.report_key, defaults.upstream.report_key);
    assert_eq!(
        from_template.upstream.system_prompt,
        defaults.upstream.system_prompt
    );
    assert_eq!(from_template.upstream.temperature, defaults.upstream.temperature);
    assert_eq!(from_template.upstream.max_tokens, defaults.upstream.max_tokens);
    assert_eq!(
        from_template.upstream.image_max_tokens,
        defaults.upstream.image_max_tokens
    );
}

#[test]
fn test_missing_file_is_read_error() {
    let temp_dir = create_temp_dir();
    let err = Config::from_file(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_load_or_default_without_file_uses_defaults() {
    let temp_dir = create_temp_dir();
    let loaded = Config::load_or_default(temp_dir.path().join("absent.toml"))
        .expect("defaults should be valid");
    assert_eq!(loaded.source, ConfigSource::Defaults);
    assert_eq!(loaded.config.server.port, 8000);
}

#[test]
fn test_load_or_default_with_file_reports_its_path() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[server]\nport = 9100\n").unwrap();

    let loaded = Config::load_or_default(&config_path).expect("file should load");
    assert_eq!(loaded.source, ConfigSource::File(config_path));
    assert_eq!(loaded.config.server.port, 9100);
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[upstream\nmodel = ").unwrap();

    let err = Config::from_file(&config_path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_invalid_values_are_validation_error() {
    let temp_dir = create_temp_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[upstream]\ntimeout_seconds = 0\n").unwrap();

    let err = Config::from_file(&config_path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Invalid configuration"), "got {}", message);
    assert!(message.contains("timeout_seconds"), "got {}", message);
}
