//! AI assistant API handler
//!
//! The display-facing tie-together of the core: classify the user's text,
//! collect one insight per selected agent, merge them into a single reply,
//! and trigger the corresponding agent runs (one agent → `run`, several →
//! `orchestrate`). Agent ids from the classification that are not in the
//! registry are skipped silently.

use crate::api::{validate_query, RouterState};
use crate::error::AppError;
use crate::intent::{self, Intent};
use crate::state::{AgentCategory, AgentOutcome};
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assistant query request
#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    /// Free-text user message
    pub message: String,
}

/// One agent's contribution to a reply
#[derive(Debug, Clone, Serialize)]
pub struct AgentInsight {
    /// ID of the contributing agent
    pub agent_id: String,
    /// Display name of the contributing agent
    pub agent_name: String,
    /// Narrative summary of the agent's findings
    pub content: String,
    /// Typed result payload backing the narrative
    pub outcome: AgentOutcome,
}

/// Assistant reply
#[derive(Debug, Serialize)]
pub struct AssistantReply {
    /// Classified intent of the message
    pub intent: Intent,
    /// Merged display text
    pub content: String,
    /// Per-agent contributions (empty for general replies)
    pub insights: Vec<AgentInsight>,
    /// Agents that were triggered, in start order
    pub agent_ids: Vec<String>,
    /// Follow-up suggestions for the user
    pub suggestions: Vec<String>,
}

/// POST /api/assistant/query - Answer a governance question
pub async fn query(
    State(state): State<RouterState>,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    validate_query(&request.message)?;

    let classification = intent::classify(&request.message);
    debug!(
        intent = classification.intent.as_str(),
        agents = ?classification.agent_ids,
        "Classified assistant query"
    );

    // Resolve classified ids against the registry; unknown ids are skipped
    let insights: Vec<AgentInsight> = {
        let app = state.orchestrator.state().read().await;
        classification
            .agent_ids
            .iter()
            .filter_map(|id| app.registry.get(id))
            .map(|agent| AgentInsight {
                agent_id: agent.id.clone(),
                agent_name: agent.name.clone(),
                content: narrative(agent.category, &agent.name, &request.message),
                outcome: AgentOutcome::simulated(agent.category),
            })
            .collect()
    };

    let reply = if insights.is_empty() {
        AssistantReply {
            intent: Intent::General,
            content: "I can help you with data governance tasks. Try asking about data \
                      quality, policy compliance, data lineage, SQL queries, or data discovery."
                .to_string(),
            insights: Vec::new(),
            agent_ids: Vec::new(),
            suggestions: default_suggestions(),
        }
    } else {
        let content = merge_insights(&insights);
        let agent_ids: Vec<String> = insights.iter().map(|i| i.agent_id.clone()).collect();

        // Fire-and-forget execution so the agent panel reflects the query
        if agent_ids.len() == 1 {
            let params = serde_json::to_value(&classification.context)
                .map_err(|e| AppError::Internal(e.into()))?;
            match state.orchestrator.run(&agent_ids[0], params).await {
                Ok(_) | Err(AppError::AgentBusy(_)) => {}
                Err(e) => return Err(e),
            }
        } else {
            state
                .orchestrator
                .orchestrate(&agent_ids, classification.intent.as_str())
                .await;
        }

        AssistantReply {
            intent: classification.intent,
            content,
            suggestions: intent::suggestions(classification.intent)
                .into_iter()
                .map(String::from)
                .collect(),
            insights,
            agent_ids,
        }
    };

    Ok(Json(reply))
}

/// Merge per-agent insights into one display text
///
/// A single insight is shown as-is; several get the coordination framing
/// with one bolded section per agent.
fn merge_insights(insights: &[AgentInsight]) -> String {
    if insights.len() == 1 {
        return insights[0].content.clone();
    }

    let mut content = format!(
        "I've coordinated with {} agents to provide you with comprehensive insights:\n\n",
        insights.len()
    );
    for insight in insights {
        content.push_str(&format!(
            "**{}**: {}\n\n",
            insight.agent_name, insight.content
        ));
    }
    content
}

/// The narrative a completed run of the given category reports
fn narrative(category: AgentCategory, agent_name: &str, query: &str) -> String {
    match category {
        AgentCategory::Policy => format!(
            "Based on regulatory analysis, I found 3 policies that apply to your query \
             about \"{query}\". MiFID II requires trade data retention for 5 years, and \
             GDPR mandates PII protection measures."
        ),
        AgentCategory::Quality => "Data quality analysis shows 2 issues in the queried \
                                   datasets. Completeness is at 87.3% with missing timestamps \
                                   in trade_orders table."
            .to_string(),
        AgentCategory::Lineage => "Found 12 upstream dependencies and 8 downstream systems \
                                   affected. The data flows from trading systems through risk \
                                   engines to regulatory reports."
            .to_string(),
        AgentCategory::Sql => "Generated optimized SQL query for your request. The query \
                               includes proper joins and filters for performance."
            .to_string(),
        AgentCategory::Discovery => "Discovered 47 new tables in the connected databases. \
                                     Found potential PII in 8 columns across 3 tables."
            .to_string(),
        AgentCategory::Compliance => {
            format!("Agent {agent_name} processed your request successfully.")
        }
    }
}

/// Suggestions shown when no specific agent applies
fn default_suggestions() -> Vec<String> {
    vec![
        "Show me data quality metrics".to_string(),
        "What are the BCBS 239 requirements?".to_string(),
        "Generate SQL for trade reporting".to_string(),
        "Find all PII in my databases".to_string(),
    ]
}
