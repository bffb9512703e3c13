//! Chat API endpoint
//!
//! Thin proxy to the OpenRouter chat-completions API. Used by the
//! conversational assistant surface; the orchestrator core never calls it.

use crate::api::RouterState;
use crate::error::AppError;
use crate::services::openrouter::{self, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use axum::{extract::State, response::Json};
use serde::Deserialize;

/// Chat proxy request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation history
    pub messages: Vec<ChatMessage>,
    /// Model override; configured default when omitted
    pub model: Option<String>,
    /// Temperature override
    pub temperature: Option<f32>,
    /// Token limit override
    pub max_tokens: Option<u32>,
}

/// POST /api/chat - Forward a conversation to the language model
pub async fn chat(
    State(state): State<RouterState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatCompletionResponse>, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::InvalidRequest(
            "Messages cannot be empty".to_string(),
        ));
    }

    let defaults = &state.config.openrouter;
    let upstream_request = ChatCompletionRequest {
        model: request.model.unwrap_or_else(|| defaults.model.clone()),
        messages: request.messages,
        temperature: request.temperature.unwrap_or(defaults.temperature),
        max_tokens: request.max_tokens.unwrap_or(defaults.max_tokens),
    };

    let response = openrouter::chat_completion(&state.http, defaults, &upstream_request).await?;
    Ok(Json(response))
}
