//! Error types for medrelay
//!
//! Relay failures never become HTTP error statuses. The query endpoint renders
//! them into a warning string via [`AppError::warning`], and the image utility
//! folds them into its result mapping.

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key is not set (expected environment variable {var})")]
    MissingApiKey { var: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upstream API returned status {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Request to {url} timed out after {timeout_seconds} seconds")]
    UpstreamTimeout { url: String, timeout_seconds: u64 },

    #[error("Request to upstream API failed: {0}")]
    Transport(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("Model did not return a response")]
    EmptyAnswer,

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image format: {0}")]
    ImageDecode(String),
}

impl AppError {
    /// Render the error as the warning text returned to chat clients
    ///
    /// Only the status code of an upstream failure is exposed; the upstream
    /// body stays in the logs.
    pub fn warning(&self) -> String {
        match self {
            Self::Validation(_) => "⚠️ Please enter a valid query.".to_string(),
            Self::UpstreamStatus { status, .. } => format!("⚠️ API Error: {}", status),
            Self::EmptyAnswer => "⚠️ Model did not return a response.".to_string(),
            other => format!("⚠️ Error: {}", other),
        }
    }

    /// True for errors that originate from the upstream call itself
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamStatus { .. }
                | Self::UpstreamTimeout { .. }
                | Self::Transport(_)
                | Self::Decode(_)
                | Self::EmptyAnswer
        )
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_creates() {
        let err = AppError::Validation("query is empty".to_string());
        assert_eq!(err.to_string(), "Invalid request: query is empty");
    }

    #[test]
    fn test_upstream_status_display_omits_body() {
        let err = AppError::UpstreamStatus {
            status: 401,
            body: "invalid api key sk-123".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream API returned status 401");
    }

    #[test]
    fn test_validation_warning_is_fixed_text() {
        let err = AppError::Validation("anything".to_string());
        assert_eq!(err.warning(), "⚠️ Please enter a valid query.");
    }

    #[test]
    fn test_upstream_status_warning_contains_code() {
        let err = AppError::UpstreamStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.warning(), "⚠️ API Error: 500");
        assert!(!err.warning().contains("boom"));
    }

    #[test]
    fn test_empty_answer_warning() {
        assert_eq!(
            AppError::EmptyAnswer.warning(),
            "⚠️ Model did not return a response."
        );
    }

    #[test]
    fn test_transport_warning_carries_message() {
        let err = AppError::Transport("connection refused".to_string());
        assert_eq!(
            err.warning(),
            "⚠️ Error: Request to upstream API failed: connection refused"
        );
    }

    #[test]
    fn test_is_upstream_classification() {
        assert!(AppError::EmptyAnswer.is_upstream());
        assert!(AppError::Decode("bad json".to_string()).is_upstream());
        assert!(!AppError::Validation("x".to_string()).is_upstream());
        assert!(!AppError::ImageDecode("x".to_string()).is_upstream());
        assert!(
            !AppError::MissingApiKey {
                var: "GROQ_API_KEY".to_string()
            }
            .is_upstream()
        );
    }
}
