//! Chat-completion wire types and HTTP client
//!
//! Only the subset of the OpenAI-style Chat Completions format that the relay
//! sends and reads is modelled here.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::CompletionClient;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single message in the outbound conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    /// System instruction message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Get the role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Get the content
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Request body sent to the completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response body from the completion endpoint
///
/// Everything except `choices[].message.content` is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Extract the first choice's message content, unmodified
    ///
    /// # Errors
    /// - [`AppError::Decode`] if there is no first choice or it has no message
    /// - [`AppError::EmptyAnswer`] if the content is missing or empty
    pub fn into_answer(self) -> AppResult<String> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Decode("response contained no choices".to_string()))?;

        let message = choice
            .message
            .ok_or_else(|| AppError::Decode("first choice has no message".to_string()))?;

        match message.content {
            Some(content) if !content.is_empty() => Ok(content),
            _ => Err(AppError::EmptyAnswer),
        }
    }
}
