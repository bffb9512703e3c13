//! Orchestration API handlers
//!
//! Multi-agent workflows: ad-hoc orchestration over an explicit agent list,
//! the built-in workflow presets, and an SSE stream that reports a preset
//! run's progress in real time (each event is formatted as a
//! `data: <json>\n\n` frame, terminated by `[DONE]`).

use crate::api::RouterState;
use crate::error::AppError;
use crate::orchestrator::{workflows, RunAck, WorkflowPreset};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Json, Response},
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::broadcast::error::RecvError;

/// Helper function to format a stream into SSE (Server-Sent Events) format
///
/// Takes a stream of `Result<String, axum::Error>` and converts it to SSE
/// format where each item is formatted as "data: <content>\n\n"
fn format_sse_stream(
    stream: impl futures_util::Stream<Item = Result<String, axum::Error>> + Send + 'static,
) -> impl futures_util::Stream<Item = Result<String, std::io::Error>> {
    stream.map(|event_result| {
        let sse_text = match event_result {
            Ok(data) => format!("data: {}\n\n", data),
            Err(e) => format!("data: [ERROR] {}\n\n", e),
        };
        Ok::<_, std::io::Error>(sse_text)
    })
}

/// Ad-hoc orchestration request
#[derive(Debug, Deserialize)]
pub struct OrchestrateRequest {
    /// Agents to invoke, in order
    pub agent_ids: Vec<String>,
    /// Workflow label attached to each run
    pub workflow: String,
}

/// Orchestration response: one acknowledgement per started agent
#[derive(Debug, Serialize)]
pub struct OrchestrateResponse {
    /// The workflow label
    pub workflow: String,
    /// Acknowledgements in start order; unknown/busy agents are absent
    pub acks: Vec<RunAck>,
}

/// POST /api/orchestrate - Run an explicit list of agents in sequence
pub async fn orchestrate(
    State(state): State<RouterState>,
    Json(request): Json<OrchestrateRequest>,
) -> Result<Json<OrchestrateResponse>, AppError> {
    if request.workflow.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Workflow label cannot be empty".to_string(),
        ));
    }

    let acks = state
        .orchestrator
        .orchestrate(&request.agent_ids, &request.workflow)
        .await;

    Ok(Json(OrchestrateResponse {
        workflow: request.workflow,
        acks,
    }))
}

/// GET /api/workflows - List the built-in workflow presets
pub async fn list_workflows() -> Json<Vec<WorkflowPreset>> {
    Json(workflows::PRESETS.to_vec())
}

/// POST /api/workflows/:name/run - Run a preset and stream its progress
///
/// Starts the preset's agents in order, then streams every lifecycle event
/// of the started agents until each has completed (or been stopped), and
/// closes with `[DONE]`.
pub async fn run_workflow(
    State(state): State<RouterState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let preset = workflows::find(&name).ok_or(AppError::WorkflowUnknown(name))?;

    // Subscribe before starting so no event is missed
    let mut events = state.orchestrator.subscribe();
    let acks = state
        .orchestrator
        .orchestrate(&preset.agent_ids(), preset.name)
        .await;

    let mut pending: HashSet<String> = acks.iter().map(|ack| ack.agent_id.clone()).collect();

    use async_stream::stream;
    let stream = stream! {
        for ack in &acks {
            if let Ok(json) = serde_json::to_string(ack) {
                yield Ok::<String, axum::Error>(json);
            }
        }

        while !pending.is_empty() {
            match events.recv().await {
                Ok(event) => {
                    if !pending.contains(event.agent_id()) {
                        continue;
                    }
                    if event.is_terminal() {
                        pending.remove(event.agent_id());
                    }
                    if let Ok(json) = serde_json::to_string(&event) {
                        yield Ok::<String, axum::Error>(json);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "SSE subscriber lagged behind agent events");
                }
                Err(RecvError::Closed) => break,
            }
        }

        // Signal stream completion
        yield Ok::<String, axum::Error>("[DONE]".to_string());
    };

    let sse_stream = format_sse_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::router_state;
    use crate::state::AgentStatus;

    #[tokio::test]
    async fn test_orchestrate_acks_follow_request_order() {
        let state = router_state();
        let request = OrchestrateRequest {
            agent_ids: vec!["discovery-agent".to_string(), "quality-agent".to_string()],
            workflow: "data-onboarding".to_string(),
        };

        let response = orchestrate(State(state), Json(request)).await.unwrap();
        let ids: Vec<&str> = response.acks.iter().map(|a| a.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["discovery-agent", "quality-agent"]);
    }

    #[tokio::test]
    async fn test_orchestrate_rejects_empty_label() {
        let state = router_state();
        let request = OrchestrateRequest {
            agent_ids: vec!["quality-agent".to_string()],
            workflow: "  ".to_string(),
        };

        let result = orchestrate(State(state), Json(request)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_list_workflows() {
        let response = list_workflows().await;
        let names: Vec<&str> = response.0.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["data-onboarding", "compliance-check", "impact-analysis"]
        );
    }

    #[tokio::test]
    async fn test_run_workflow_unknown_name() {
        let state = router_state();
        let result = run_workflow(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(AppError::WorkflowUnknown(_))));
    }

    #[tokio::test]
    async fn test_run_workflow_starts_preset_agents() {
        let state = router_state();
        let response = run_workflow(State(state.clone()), Path("impact-analysis".to_string()))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        // Both preset agents were started by the handler
        for id in ["lineage-agent", "sql-agent"] {
            let status = state.orchestrator.status(id).await.unwrap();
            assert!(matches!(
                status,
                AgentStatus::Running | AgentStatus::Completed
            ));
        }
    }
}
