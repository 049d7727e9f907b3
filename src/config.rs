//! Configuration management for medrelay
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; missing fields fall back to documented defaults.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the upstream timeout in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Chat-completion API settings
///
/// The API key itself never lives in the config file; only the name of the
/// environment variable that holds it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Key the image utility reports the model's answer under
    #[serde(default = "default_report_key")]
    pub report_key: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Token limit for text queries
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token limit for image queries
    #[serde(default = "default_image_max_tokens")]
    pub image_max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl UpstreamConfig {
    /// Timeout applied to every outbound completion request
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            report_key: default_report_key(),
            api_key_env: default_api_key_env(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            image_max_tokens: default_image_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-4-scout-17b-16e-instruct".to_string()
}

fn default_report_key() -> String {
    "llama-4-scout-17b".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful medical assistant.".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_image_max_tokens() -> u32 {
    1000
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file existed at the requested path
    Defaults,
}

/// Configuration together with its origin
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Bearer token for the chat-completion API
///
/// Resolved once at startup and handed to the client. `Debug` never prints
/// the secret.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting empty or whitespace-only values
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Read the key from the named environment variable
    ///
    /// # Errors
    /// Returns [`AppError::MissingApiKey`] if the variable is unset, not
    /// unicode, or blank.
    pub fn from_env(var: &str) -> AppResult<Self> {
        std::env::var(var)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| AppError::MissingApiKey {
                var: var.to_string(),
            })
    }

    /// Get the raw token
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load the file if it exists, otherwise use the built-in defaults
    ///
    /// Nothing is logged here since this usually runs before telemetry is
    /// initialised; callers log based on [`LoadedConfig::source`].
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AppResult<LoadedConfig> {
        if path.as_ref().exists() {
            return Ok(LoadedConfig {
                config: Self::from_file(path.as_ref())?,
                source: ConfigSource::File(path.as_ref().to_path_buf()),
            });
        }
        let config = Self::default();
        config.validate()?;
        Ok(LoadedConfig {
            config,
            source: ConfigSource::Defaults,
        })
    }

    /// Resolve the API key named by `upstream.api_key_env`
    pub fn api_key(&self) -> AppResult<ApiKey> {
        ApiKey::from_env(&self.upstream.api_key_env)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> AppResult<std::net::SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            AppError::Config(format!(
                "server.host must be an IP address, got '{}'",
                self.server.host
            ))
        })?;
        Ok(std::net::SocketAddr::from((ip, self.server.port)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port must be non-zero".to_string()));
        }
        self.bind_addr()?;

        for origin in &self.server.cors_allowed_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(AppError::Config(format!(
                    "server.cors_allowed_origins contains an invalid origin: '{}'",
                    origin
                )));
            }
        }

        let upstream = &self.upstream;
        if !(upstream.api_url.starts_with("http://") || upstream.api_url.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "upstream.api_url must start with http:// or https://, got '{}'",
                upstream.api_url
            )));
        }

        for (field, value) in [
            ("upstream.model", &upstream.model),
            ("upstream.report_key", &upstream.report_key),
            ("upstream.api_key_env", &upstream.api_key_env),
            ("upstream.system_prompt", &upstream.system_prompt),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} cannot be empty", field)));
            }
        }

        if !upstream.temperature.is_finite() || !(0.0..=2.0).contains(&upstream.temperature) {
            return Err(AppError::Config(format!(
                "upstream.temperature must be between 0.0 and 2.0, got {}",
                upstream.temperature
            )));
        }

        if upstream.max_tokens == 0 || upstream.image_max_tokens == 0 {
            return Err(AppError::Config(
                "upstream.max_tokens and upstream.image_max_tokens must be greater than 0"
                    .to_string(),
            ));
        }

        if upstream.timeout_seconds == 0 || upstream.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(AppError::Config(format!(
                "upstream.timeout_seconds must be in 1..={}, got {}",
                MAX_TIMEOUT_SECONDS, upstream.timeout_seconds
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: Config = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(
            config.upstream.api_url,
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            config.upstream.model,
            "meta-llama/llama-4-scout-17b-16e-instruct"
        );
        assert_eq!(config.upstream.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.upstream.temperature, 0.7);
        assert_eq!(config.upstream.max_tokens, 500);
        assert_eq!(config.upstream.image_max_tokens, 1000);
        assert_eq!(config.upstream.timeout(), Duration::from_secs(30));
        assert_eq!(config.observability.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_upstream_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[upstream]
model = "llama-3.1-8b-instant"
"#,
        )
        .expect("should parse");
        assert_eq!(config.upstream.model, "llama-3.1-8b-instant");
        assert_eq!(config.upstream.system_prompt, "You are a helpful medical assistant.");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.upstream.api_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upstream.api_url"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.upstream.temperature = 2.5;
        assert!(config.validate().is_err());
        config.upstream.temperature = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_and_huge_timeout() {
        let mut config = Config::default();
        config.upstream.timeout_seconds = 0;
        assert!(config.validate().is_err());
        config.upstream.timeout_seconds = 301;
        assert!(config.validate().is_err());
        config.upstream.timeout_seconds = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let mut config = Config::default();
        config.upstream.model = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upstream.model cannot be empty"));
    }

    #[test]
    fn test_validate_rejects_non_ip_host() {
        let mut config = Config::default();
        config.server.host = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        let addr = config.bind_addr().expect("default host is valid");
        assert_eq!(addr.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_api_key_rejects_blank() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   ").is_none());
        assert_eq!(ApiKey::new(" gsk_abc ").unwrap().expose(), "gsk_abc");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("gsk_secret").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }

    #[test]
    fn test_config_api_key_with_unset_variable_is_missing() {
        let mut config = Config::default();
        config.upstream.api_key_env = "MEDRELAY_TEST_UNSET_CONFIG_KEY_VAR".to_string();

        let err = config.api_key().unwrap_err();
        assert!(
            matches!(err, AppError::MissingApiKey { ref var } if var == "MEDRELAY_TEST_UNSET_CONFIG_KEY_VAR"),
            "got {:?}",
            err
        );
        assert!(err.to_string().contains("MEDRELAY_TEST_UNSET_CONFIG_KEY_VAR"));
    }

    #[test]
    fn test_default_report_key_is_short_model_label() {
        assert_eq!(Config::default().upstream.report_key, "llama-4-scout-17b");
    }

    #[test]
    fn test_validate_rejects_blank_report_key() {
        let mut config = Config::default();
        config.upstream.report_key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_from_unset_env_is_missing() {
        let err = ApiKey::from_env("MEDRELAY_TEST_UNSET_API_KEY_VAR").unwrap_err();
        assert!(matches!(err, AppError::MissingApiKey { ref var } if var == "MEDRELAY_TEST_UNSET_API_KEY_VAR"));
    }
}
