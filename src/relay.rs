//! Text query relay
//!
//! Turns a user query into a two-message chat request (system instruction,
//! then the query) and returns the model's answer.

use crate::completion::{ChatCompletionRequest, ChatMessage, CompletionClient};
use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};

/// Unicode whitespace plus the ASCII information separators U+001C..=U+001F
fn is_query_padding(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// A user query, guaranteed non-empty after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trim and validate raw query text
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for empty or whitespace-only input.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim_matches(is_query_padding);
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "query cannot be empty or contain only whitespace".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Relay for plain-text queries
#[derive(Debug, Clone)]
pub struct QueryRelay {
    client: CompletionClient,
    model: String,
    system_prompt: String,
    temperature: f64,
    max_tokens: u32,
}

impl QueryRelay {
    pub fn new(client: CompletionClient, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            model: upstream.model.clone(),
            system_prompt: upstream.system_prompt.clone(),
            temperature: upstream.temperature,
            max_tokens: upstream.max_tokens,
        }
    }

    /// Build the outbound payload for a validated query
    pub fn build_request(&self, query: &Query) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.as_str()),
                ChatMessage::user(query.as_str()),
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }

    /// Validate `raw_query`, forward it, and return the model's answer
    ///
    /// No outbound request is made when validation fails.
    pub async fn ask(&self, raw_query: &str) -> AppResult<String> {
        let query = Query::parse(raw_query)?;
        let request = self.build_request(&query);
        self.client.complete(&request).await
    }
}
