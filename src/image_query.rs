//! Image query utility
//!
//! Reads a local image, checks that it decodes, and sends it inline (as a
//! base64 data URI inside the prompt text) together with a query.

use crate::completion::{ChatCompletionRequest, ChatMessage, CompletionClient};
use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use crate::relay::Query;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// MIME label used in the inline data URI, independent of the real format
const INLINE_IMAGE_MIME: &str = "image/jpeg";

/// Report key used for failures that happen before the model is queried
pub const ERROR_KEY: &str = "error";

/// Image bytes that decoded successfully, in base64 form
#[derive(Debug, Clone)]
pub struct EncodedImage {
    base64: String,
}

impl EncodedImage {
    /// Validate that `bytes` is a decodable raster image and encode the original bytes
    ///
    /// # Errors
    /// Returns [`AppError::ImageDecode`] if the bytes are not a supported image.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|e| {
            tracing::error!(error = %e, "Invalid image format");
            AppError::ImageDecode(e.to_string())
        })?;

        tracing::debug!(
            width = decoded.width(),
            height = decoded.height(),
            bytes = bytes.len(),
            "Image validated"
        );

        Ok(Self {
            base64: BASE64.encode(bytes),
        })
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// `data:` URI embedding the image
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", INLINE_IMAGE_MIME, self.base64)
    }
}

/// Combine query text and image into the single prompt string sent upstream
pub fn build_prompt(query: &Query, image: &EncodedImage) -> String {
    format!("{}\n![image]({})", query.as_str(), image.data_uri())
}

/// Result mapping printed by the image subcommand
///
/// Holds exactly one entry: the report key mapped to the model's answer (or
/// an upstream error string), or [`ERROR_KEY`] mapped to an input failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageQueryReport(BTreeMap<String, String>);

impl ImageQueryReport {
    fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(BTreeMap::from([(key.into(), value.into())]))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True when the image or query never reached the model
    pub fn is_input_error(&self) -> bool {
        self.0.contains_key(ERROR_KEY)
    }
}

/// Relay for image + text queries
#[derive(Debug, Clone)]
pub struct ImageQuery {
    client: CompletionClient,
    model: String,
    report_key: String,
    max_tokens: u32,
}

impl ImageQuery {
    pub fn new(client: CompletionClient, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            model: upstream.model.clone(),
            report_key: upstream.report_key.clone(),
            max_tokens: upstream.image_max_tokens,
        }
    }

    /// Model name sent upstream
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Key under which the model's answer is reported
    pub fn report_key(&self) -> &str {
        &self.report_key
    }

    /// Build the one-message payload for a validated query and image
    pub fn build_request(&self, query: &Query, image: &EncodedImage) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(query, image))],
            temperature: None,
            max_tokens: Some(self.max_tokens),
        }
    }

    /// Read and validate the image at `path`, then ask the model about it
    ///
    /// No outbound request is made unless the file, the query and the image
    /// are all valid.
    pub async fn ask(&self, path: &Path, raw_query: &str) -> AppResult<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| AppError::ImageRead {
                path: path.display().to_string(),
                source,
            })?;

        let query = Query::parse(raw_query)?;
        let image = EncodedImage::from_bytes(&bytes)?;
        let request = self.build_request(&query, &image);

        // An empty content string is still the model's answer here
        let answer = match self.client.complete(&request).await {
            Err(AppError::EmptyAnswer) => String::new(),
            other => other?,
        };
        tracing::info!(model = %self.model, answer = %answer, "Response");
        Ok(answer)
    }

    /// Run [`ask`](Self::ask) and fold the outcome into a report
    pub async fn run(&self, path: &Path, raw_query: &str) -> ImageQueryReport {
        match self.ask(path, raw_query).await {
            Ok(answer) => ImageQueryReport::single(&self.report_key, answer),
            Err(AppError::UpstreamStatus { status, .. }) => {
                ImageQueryReport::single(&self.report_key, format!("Error: {}", status))
            }
            Err(e) if e.is_upstream() => {
                tracing::error!(error = %e, "Image query failed");
                ImageQueryReport::single(&self.report_key, format!("Error: {}", e))
            }
            Err(e) => ImageQueryReport::single(ERROR_KEY, e.to_string()),
        }
    }
}
