// Agent registry
// Canonical list of governance agents and read/write access to their status

use crate::state::outcome::AgentOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for an agent
pub type AgentId = String;

/// Agent status enumeration
/// Represents the current lifecycle state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Agent is not running
    Idle,
    /// Agent is currently running
    Running,
    /// Agent finished its last run
    Completed,
    /// Agent encountered an error
    ///
    /// Present for model fidelity; no core path sets it.
    Error,
}

/// Agent category enumeration
/// The fixed set of governance domains an agent can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    /// Data lineage and dependency analysis
    Lineage,
    /// Data quality monitoring
    Quality,
    /// Policy and regulatory compliance
    Policy,
    /// Natural language to SQL translation
    Sql,
    /// Data discovery and cataloging
    Discovery,
    /// Compliance auditing
    Compliance,
}

/// Agent structure
/// Represents a simulated governance agent with its description and state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    /// Unique identifier for the agent
    pub id: AgentId,
    /// Display name of the agent
    pub name: String,
    /// Short description of what the agent does
    pub description: String,
    /// Governance domain the agent belongs to
    pub category: AgentCategory,
    /// What the agent can do, as display strings
    pub capabilities: Vec<String>,
    /// Current status of the agent
    pub status: AgentStatus,
    /// Progress of the current run (0-100), if running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// When the agent last completed a run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    /// Result of the last completed run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AgentOutcome>,
}

impl Agent {
    /// Create a new idle agent
    pub fn new(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: AgentCategory,
        capabilities: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            status: AgentStatus::Idle,
            progress: None,
            last_run: None,
            outcome: None,
        }
    }
}

/// Registry of all agents
///
/// Holds the canonical agent list and preserves the seed/registration order:
/// `list()` returns agents in the order they were first inserted.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Agent>,
    order: Vec<AgentId>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in governance agents
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for agent in default_agents() {
            registry.upsert(agent);
        }
        registry
    }

    /// Get all agents in registration order
    pub fn list(&self) -> Vec<&Agent> {
        self.order
            .iter()
            .filter_map(|id| self.agents.get(id))
            .collect()
    }

    /// Get an agent by ID
    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Get a mutable reference to an agent by ID
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Insert or replace an agent
    ///
    /// Replaces the record in place if the ID already exists (keeping its
    /// position), otherwise appends. No validation of field values.
    pub fn upsert(&mut self, agent: Agent) {
        if !self.agents.contains_key(&agent.id) {
            self.order.push(agent.id.clone());
        }
        self.agents.insert(agent.id.clone(), agent);
    }

    /// Update an agent's status and optionally its progress
    /// Returns false (no-op) if the ID is unknown
    pub fn set_status(&mut self, id: &str, status: AgentStatus, progress: Option<u8>) -> bool {
        if let Some(agent) = self.agents.get_mut(id) {
            agent.status = status;
            if let Some(progress) = progress {
                agent.progress = Some(progress.min(100));
            }
            true
        } else {
            false
        }
    }

    /// Current status of an agent, if it exists
    pub fn status(&self, id: &str) -> Option<AgentStatus> {
        self.agents.get(id).map(|agent| agent.status)
    }

    /// Whether the given ID is registered
    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// The built-in agent seed list
///
/// One agent per governance domain, created at process start and mutated in
/// place as runs are simulated; agents are never destroyed within a session.
pub fn default_agents() -> Vec<Agent> {
    vec![
        Agent::new(
            "lineage-agent",
            "Data Lineage Agent",
            "Analyzes data flow and dependencies across systems",
            AgentCategory::Lineage,
            &[
                "SQL parsing for lineage extraction",
                "Cross-system dependency mapping",
                "Impact analysis",
                "Automated lineage discovery",
            ],
        ),
        Agent::new(
            "quality-agent",
            "Data Quality Agent",
            "Monitors data quality metrics and generates recommendations",
            AgentCategory::Quality,
            &[
                "Completeness validation",
                "Accuracy assessment",
                "Timeliness monitoring",
                "Consistency checking",
            ],
        ),
        Agent::new(
            "policy-agent",
            "Policy Compliance Agent",
            "Ensures regulatory compliance and policy adherence",
            AgentCategory::Policy,
            &[
                "Regulatory mapping",
                "Compliance checking",
                "Policy Q&A",
                "Risk assessment",
            ],
        ),
        Agent::new(
            "sql-agent",
            "SQL Query Agent",
            "Natural language to SQL translation and query optimization",
            AgentCategory::Sql,
            &[
                "Natural language to SQL",
                "Query optimization",
                "Performance analysis",
                "Schema understanding",
            ],
        ),
        Agent::new(
            "discovery-agent",
            "Data Discovery Agent",
            "Automated data cataloging and classification",
            AgentCategory::Discovery,
            &[
                "Schema discovery",
                "PII detection",
                "Data classification",
                "Metadata extraction",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_seeds_five_idle_agents() {
        let registry = AgentRegistry::with_defaults();
        assert_eq!(registry.len(), 5);
        for agent in registry.list() {
            assert_eq!(agent.status, AgentStatus::Idle);
            assert!(agent.progress.is_none());
            assert!(agent.last_run.is_none());
            assert_eq!(agent.capabilities.len(), 4);
        }
    }

    #[test]
    fn test_list_preserves_seed_order() {
        let registry = AgentRegistry::with_defaults();
        let ids: Vec<&str> = registry.list().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "lineage-agent",
                "quality-agent",
                "policy-agent",
                "sql-agent",
                "discovery-agent",
            ]
        );
    }

    #[test]
    fn test_upsert_appends_new_agent() {
        let mut registry = AgentRegistry::with_defaults();
        registry.upsert(Agent::new(
            "audit-agent",
            "Audit Agent",
            "Runs compliance audits",
            AgentCategory::Compliance,
            &["Audit trail review"],
        ));

        assert_eq!(registry.len(), 6);
        assert_eq!(registry.list().last().unwrap().id, "audit-agent");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut registry = AgentRegistry::with_defaults();
        let mut replacement = registry.get("quality-agent").unwrap().clone();
        replacement.name = "Quality Agent v2".to_string();
        registry.upsert(replacement);

        assert_eq!(registry.len(), 5);
        // Position unchanged
        assert_eq!(registry.list()[1].name, "Quality Agent v2");
    }

    #[test]
    fn test_set_status_known_agent() {
        let mut registry = AgentRegistry::with_defaults();
        assert!(registry.set_status("policy-agent", AgentStatus::Running, Some(0)));

        let agent = registry.get("policy-agent").unwrap();
        assert_eq!(agent.status, AgentStatus::Running);
        assert_eq!(agent.progress, Some(0));
    }

    #[test]
    fn test_set_status_unknown_agent_is_noop() {
        let mut registry = AgentRegistry::with_defaults();
        let before: Vec<Agent> = registry.list().into_iter().cloned().collect();

        assert!(!registry.set_status("nonexistent", AgentStatus::Running, Some(50)));

        assert_eq!(registry.len(), 5);
        let after: Vec<Agent> = registry.list().into_iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_status_caps_progress() {
        let mut registry = AgentRegistry::with_defaults();
        registry.set_status("sql-agent", AgentStatus::Running, Some(250));
        assert_eq!(registry.get("sql-agent").unwrap().progress, Some(100));
    }

    #[test]
    fn test_status_lookup() {
        let registry = AgentRegistry::with_defaults();
        assert_eq!(registry.status("lineage-agent"), Some(AgentStatus::Idle));
        assert_eq!(registry.status("nonexistent"), None);
    }
}
