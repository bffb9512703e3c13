//! Realtime agent events
//!
//! The orchestrator broadcasts an `AgentEvent` on every observable state
//! transition; WebSocket and SSE subscribers forward them to clients.

use crate::state::{AgentId, AgentOutcome};
use serde::{Deserialize, Serialize};

/// Capacity of the broadcast channel carrying agent events
///
/// Slow subscribers that fall further behind than this lag and skip.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Agent lifecycle events for real-time communication
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum AgentEvent {
    /// An agent run was started
    #[serde(rename = "agent_started")]
    Started {
        /// ID of the agent that started
        agent_id: AgentId,
        /// Workflow label the run belongs to, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        workflow: Option<String>,
    },
    /// A running agent advanced its progress
    #[serde(rename = "agent_progress")]
    Progress {
        /// ID of the running agent
        agent_id: AgentId,
        /// Progress after the tick (0-100)
        progress: u8,
    },
    /// An agent run reached 100% and completed
    #[serde(rename = "agent_completed")]
    Completed {
        /// ID of the completed agent
        agent_id: AgentId,
        /// Result payload of the run
        outcome: AgentOutcome,
    },
    /// An agent was stopped and reset to idle
    #[serde(rename = "agent_stopped")]
    Stopped {
        /// ID of the stopped agent
        agent_id: AgentId,
    },
}

impl AgentEvent {
    /// The agent this event concerns
    pub fn agent_id(&self) -> &str {
        match self {
            AgentEvent::Started { agent_id, .. }
            | AgentEvent::Progress { agent_id, .. }
            | AgentEvent::Completed { agent_id, .. }
            | AgentEvent::Stopped { agent_id } => agent_id,
        }
    }

    /// Whether this event ends a run (completion or stop)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::Completed { .. } | AgentEvent::Stopped { .. }
        )
    }
}
