//! OpenRouter API client
//!
//! Direct HTTP client for the OpenRouter chat-completions endpoint. Used by
//! the chat proxy and the policy question-answering handlers; the
//! orchestrator core never calls it.

use crate::config::OpenRouterConfig;
use crate::error::AppError;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system", "user" or "assistant")
    pub role: String,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Build a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Build a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request payload for the chat-completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation history
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
}

/// A single completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
    /// Why generation stopped, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Response payload of the chat-completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Upstream response identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Model that produced the response
    #[serde(default)]
    pub model: Option<String>,
    /// Generated choices (at least one on success)
    pub choices: Vec<ChatChoice>,
}

/// Call the OpenRouter chat-completions endpoint
///
/// # Errors
/// * `AppError::Internal` if no API key is configured
/// * `AppError::UpstreamApi` if the request fails, the API returns a
///   non-success status, or the response cannot be parsed
pub async fn chat_completion(
    client: &reqwest::Client,
    config: &OpenRouterConfig,
    request: &ChatCompletionRequest,
) -> Result<ChatCompletionResponse, AppError> {
    if config.api_key.is_empty() {
        return Err(AppError::Internal(anyhow!(
            "OpenRouter API key is not configured"
        )));
    }

    let url = format!("{}/chat/completions", config.base_url);

    tracing::debug!(
        url = %url,
        model = %request.model,
        messages = request.messages.len(),
        "Calling OpenRouter API"
    );

    let mut builder = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .header("X-Title", "Governance Insights")
        .json(request);
    if let Some(referer) = &config.referer {
        builder = builder.header("HTTP-Referer", referer);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| AppError::UpstreamApi(format!("failed to reach OpenRouter: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());

        tracing::error!(
            status_code = status.as_u16(),
            error_body = %error_body,
            "OpenRouter API returned error status"
        );

        return Err(AppError::UpstreamApi(format!(
            "OpenRouter returned HTTP {}: {}",
            status.as_u16(),
            error_body
        )));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| AppError::UpstreamApi(format!("invalid OpenRouter response: {e}")))?;

    tracing::debug!(
        choices = parsed.choices.len(),
        "Received OpenRouter response"
    );

    Ok(parsed)
}

/// Run a single-turn completion and return the generated text
///
/// Convenience wrapper for callers that only need the first choice's content.
pub async fn complete_text(
    client: &reqwest::Client,
    config: &OpenRouterConfig,
    messages: Vec<ChatMessage>,
) -> Result<String, AppError> {
    let request = ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let response = chat_completion(client, config, &request).await?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AppError::UpstreamApi("OpenRouter response has no choices".to_string()))?;

    Ok(choice.message.content)
}
