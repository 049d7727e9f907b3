//! HTTP client for the chat-completion endpoint
//!
//! One POST per call, bearer-token auth, no retries.

use crate::completion::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::{ApiKey, UpstreamConfig};
use crate::error::{AppError, AppResult};
use std::time::Duration;

/// Maximum number of upstream body characters attached to log events
const MAX_LOGGED_BODY_CHARS: usize = 500;

/// Client bound to one completion endpoint and one API key
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: ApiKey,
    timeout: Duration,
}

impl CompletionClient {
    /// Create a client from upstream configuration and a resolved API key
    ///
    /// # Errors
    /// Returns [`AppError::Config`] if the underlying HTTP client cannot be built.
    pub fn new(upstream: &UpstreamConfig, api_key: ApiKey) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: upstream.api_url.clone(),
            api_key,
            timeout: upstream.timeout(),
        })
    }

    /// Send a completion request and return the first choice's content
    ///
    /// # Errors
    /// - [`AppError::UpstreamTimeout`] if the request exceeds the configured timeout
    /// - [`AppError::Transport`] for connection and other send failures
    /// - [`AppError::UpstreamStatus`] for any non-2xx status
    /// - [`AppError::Decode`] / [`AppError::EmptyAnswer`] for unusable bodies
    pub async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<String> {
        tracing::debug!(
            url = %self.api_url,
            model = %request.model,
            message_count = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %truncate_for_log(&body),
                "API Error"
            );
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate_for_log(&body),
                "Upstream returned malformed JSON"
            );
            AppError::Decode(e.to_string())
        })?;

        parsed.into_answer()
    }

    fn classify_send_error(&self, error: reqwest::Error) -> AppError {
        if error.is_timeout() {
            AppError::UpstreamTimeout {
                url: self.api_url.clone(),
                timeout_seconds: self.timeout.as_secs(),
            }
        } else {
            AppError::Transport(error.to_string())
        }
    }
}

fn truncate_for_log(body: &str) -> String {
    if body.chars().count() <= MAX_LOGGED_BODY_CHARS {
        return body.to_string();
    }
    let truncated: String = body.chars().take(MAX_LOGGED_BODY_CHARS).collect();
    format!("{}...", truncated)
}
