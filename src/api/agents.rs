//! Agent management API handlers
//!
//! Contains HTTP request handlers for listing, registering, running and
//! stopping agents.

use crate::api::RouterState;
use crate::error::AppError;
use crate::orchestrator::RunAck;
use crate::state::{Agent, AgentCategory, AgentStatus};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Agents list response
#[derive(Serialize)]
pub struct AgentsListResponse {
    /// List of all agents, in registration order
    pub agents: Vec<Agent>,
    /// Total number of agents
    pub count: usize,
}

/// Register (upsert) agent request
#[derive(Deserialize)]
pub struct RegisterAgentRequest {
    /// Identifier; generated when omitted
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Governance domain
    pub category: AgentCategory,
    /// Capability display strings
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// GET /api/agents - List all agents
pub async fn list_agents(State(state): State<RouterState>) -> Json<AgentsListResponse> {
    let app = state.orchestrator.state().read().await;
    let agents: Vec<Agent> = app.registry.list().into_iter().cloned().collect();

    Json(AgentsListResponse {
        count: agents.len(),
        agents,
    })
}

/// GET /api/agents/:id - Get a specific agent
pub async fn get_agent(
    State(state): State<RouterState>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, AppError> {
    let app = state.orchestrator.state().read().await;
    let agent = app
        .registry
        .get(&id)
        .cloned()
        .ok_or(AppError::AgentNotFound(id))?;

    Ok(Json(agent))
}

/// POST /api/agents - Register or replace an agent
pub async fn register_agent(
    State(state): State<RouterState>,
    Json(request): Json<RegisterAgentRequest>,
) -> Result<(StatusCode, Json<Agent>), AppError> {
    let id = request
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut agent = Agent::new(
        id.clone(),
        request.name,
        request.description,
        request.category,
        &[],
    );
    agent.capabilities = request.capabilities;

    let mut app = state.orchestrator.state().write().await;
    app.registry.upsert(agent);
    let agent = app
        .registry
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Agent not found after upsert")))?;

    Ok((StatusCode::CREATED, Json(agent)))
}

/// POST /api/agents/:id/run - Start a simulated run
///
/// Responds with the immediate acknowledgement; completion is observable via
/// the registry, the WebSocket channel, or the workflow SSE stream.
pub async fn run_agent(
    State(state): State<RouterState>,
    Path(id): Path<String>,
    payload: Option<Json<Value>>,
) -> Result<Json<RunAck>, AppError> {
    let params = payload.map(|Json(value)| value).unwrap_or(Value::Null);
    let ack = state.orchestrator.run(&id, params).await?;
    Ok(Json(ack))
}

/// POST /api/agents/:id/stop - Stop an agent and reset it to idle
pub async fn stop_agent(
    State(state): State<RouterState>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, AppError> {
    state.orchestrator.stop(&id).await?;

    let app = state.orchestrator.state().read().await;
    let agent = app
        .registry
        .get(&id)
        .cloned()
        .ok_or(AppError::AgentNotFound(id))?;

    debug_assert_eq!(agent.status, AgentStatus::Idle);
    Ok(Json(agent))
}
