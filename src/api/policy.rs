//! Policy document API handlers
//!
//! Upload indexes a policy document into the in-memory store; ask retrieves
//! the most relevant excerpts and has the language model answer from them.

use crate::api::{validate_query, RouterState};
use crate::error::AppError;
use crate::services::openrouter::{self, ChatMessage};
use crate::services::policy::{validate_extension, RETRIEVAL_TOP_K};
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Characters of each source excerpt echoed back with an answer
const SOURCE_PREVIEW_CHARS: usize = 200;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Human-readable confirmation
    pub message: String,
    /// Name the document was indexed under
    pub source: String,
    /// Number of chunks indexed
    pub chunks_indexed: usize,
}

/// Question request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The question to answer from the indexed documents
    pub question: String,
    /// Opaque caller context, echoed back
    #[serde(default)]
    pub context: Option<Value>,
}

/// Answer response
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Model-generated answer
    pub answer: String,
    /// Previews of the excerpts the answer drew on
    pub sources: Vec<String>,
    /// Echoed caller context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// POST /api/policy/upload - Index a policy document
///
/// Accepts a multipart form with a `file` field. Only plain-text documents
/// (`.txt`, `.md`) are supported.
pub async fn upload(
    State(state): State<RouterState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::InvalidRequest("file field has no filename".to_string()))?;
        validate_extension(&file_name)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("failed to read upload: {e}")))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::InvalidRequest("document is not valid UTF-8".to_string()))?;

        let chunks_indexed = state.policies.write().await.ingest(&file_name, &text);
        info!(source = %file_name, chunks = chunks_indexed, "Policy document uploaded");

        return Ok(Json(UploadResponse {
            message: "Policy document processed successfully".to_string(),
            source: file_name,
            chunks_indexed,
        }));
    }

    Err(AppError::InvalidRequest(
        "multipart body has no file field".to_string(),
    ))
}

/// POST /api/policy/ask - Answer a question from the indexed documents
pub async fn ask(
    State(state): State<RouterState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    validate_query(&request.question)?;

    let excerpts: Vec<String> = {
        let store = state.policies.read().await;
        if store.is_empty() {
            return Err(AppError::NoPolicyDocuments);
        }
        store
            .retrieve(&request.question, RETRIEVAL_TOP_K)
            .into_iter()
            .map(|chunk| chunk.text.clone())
            .collect()
    };

    let prompt = build_prompt(&excerpts, &request.question);
    let answer = openrouter::complete_text(
        &state.http,
        &state.config.openrouter,
        vec![
            ChatMessage::system(
                "You are a data-governance policy assistant. Answer strictly from the \
                 provided policy excerpts; say so when the excerpts do not cover the question.",
            ),
            ChatMessage::user(prompt),
        ],
    )
    .await?;

    let sources = excerpts.iter().map(|text| preview(text)).collect();

    Ok(Json(AskResponse {
        answer,
        sources,
        context: request.context,
    }))
}

/// Assemble the question prompt from the retrieved excerpts
fn build_prompt(excerpts: &[String], question: &str) -> String {
    let mut prompt = String::from("Policy excerpts:\n");
    for (index, excerpt) in excerpts.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n\n", index + 1, excerpt));
    }
    prompt.push_str(&format!("Question: {question}"));
    prompt
}

/// Truncated excerpt preview returned alongside an answer
fn preview(text: &str) -> String {
    if text.chars().count() <= SOURCE_PREVIEW_CHARS {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(SOURCE_PREVIEW_CHARS).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{router_state, router_state_with_config};
    use crate::config::Config;
    use mockito::Server;
    use serial_test::serial;

    #[tokio::test]
    async fn test_ask_without_documents() {
        let state = router_state();
        let request = AskRequest {
            question: "What is the retention period?".to_string(),
            context: None,
        };

        let result = ask(State(state), Json(request)).await;
        assert!(matches!(result, Err(AppError::NoPolicyDocuments)));
    }

    #[tokio::test]
    async fn test_ask_rejects_empty_question() {
        let state = router_state();
        let request = AskRequest {
            question: String::new(),
            context: None,
        };

        let result = ask(State(state), Json(request)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    #[serial]
    async fn test_ask_answers_from_indexed_documents() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                r#"{
                    "choices": [{
                        "message": {"role": "assistant", "content": "Five years."}
                    }]
                }"#,
            )
            .create_async()
            .await;

        let mut config = Config::from_env();
        config.openrouter.api_key = "test-key".to_string();
        config.openrouter.base_url = server.url();
        let state = router_state_with_config(config);

        state.policies.write().await.ingest(
            "retention.txt",
            "Under MiFID II, trade data retention must span five years.",
        );

        let request = AskRequest {
            question: "How long is the trade data retention period?".to_string(),
            context: Some(serde_json::json!({"page": "policy-studio"})),
        };
        let response = ask(State(state), Json(request)).await.unwrap().0;

        mock.assert_async().await;
        assert_eq!(response.answer, "Five years.");
        assert!(!response.sources.is_empty());
        assert!(response.sources[0].contains("MiFID II"));
        assert_eq!(response.context.unwrap()["page"], "policy-studio");
    }

    #[test]
    fn test_preview_truncates_long_excerpts() {
        let text = "x".repeat(300);
        let result = preview(&text);
        assert_eq!(result.chars().count(), SOURCE_PREVIEW_CHARS + 3);
        assert!(result.ends_with("..."));

        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_build_prompt_numbers_excerpts() {
        let excerpts = vec!["First excerpt.".to_string(), "Second excerpt.".to_string()];
        let prompt = build_prompt(&excerpts, "What applies?");
        assert!(prompt.contains("[1] First excerpt."));
        assert!(prompt.contains("[2] Second excerpt."));
        assert!(prompt.ends_with("Question: What applies?"));
    }
}
