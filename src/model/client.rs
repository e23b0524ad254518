//! Chat completions API client
//!
//! Direct HTTP client for an OpenAI-compatible chat completions endpoint.
//! The base URL, model and credential come from configuration; any
//! OpenAI-compatible provider can be substituted without code changes.

use crate::config::ModelConfig;
use crate::error::AppError;
use crate::model::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// Maximum number of provider error-body characters carried into an error
/// message. Keeps raw provider output out of anything user-visible.
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP client for the chat completions endpoint
///
/// Holds a shared `reqwest::Client` for connection pooling across requests.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: ModelConfig,
}

impl ChatClient {
    /// Create a new client for the given provider configuration
    pub fn new(config: ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Free-text completion: send messages, return the model's text reply
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
        self.request(messages, None).await
    }

    /// JSON-mode completion: the model must reply with a single JSON object
    pub async fn complete_json(&self, messages: Vec<ChatMessage>) -> Result<String, AppError> {
        self.request(messages, Some(ResponseFormat::json_object()))
            .await
    }

    async fn request(
        &self,
        messages: Vec<ChatMessage>,
        response_format: Option<ResponseFormat>,
    ) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request_body = ChatRequest {
            model: self.config.model.clone(),
            messages,
            response_format,
        };

        tracing::debug!(
            url = %url,
            model = %self.config.model,
            json_mode = request_body.response_format.is_some(),
            "Calling chat completions API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                AppError::ModelInvocation(format!("failed to send HTTP request: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            let truncated: String = error_body.chars().take(ERROR_BODY_LIMIT).collect();

            tracing::error!(
                status_code = status.as_u16(),
                error_body = %truncated,
                "Chat completions API returned error status"
            );

            return Err(AppError::ModelInvocation(format!(
                "provider returned HTTP {}: {}",
                status.as_u16(),
                truncated
            )));
        }

        let response_body = response.text().await.map_err(|e| {
            AppError::ModelInvocation(format!("failed to read response body: {}", e))
        })?;

        let parsed: ChatResponse = serde_json::from_str(&response_body).map_err(|e| {
            AppError::ModelInvocation(format!("failed to parse provider response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ModelInvocation("response contains no choices".to_string()))?;

        let text = choice
            .message
            .content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::ModelInvocation("response text is empty".to_string()))?;

        tracing::debug!(
            response_len = text.len(),
            "Successfully received response from chat completions API"
        );

        Ok(text)
    }
}
