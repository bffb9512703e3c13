//! Named workflow presets
//!
//! Fixed multi-agent workflows the product exposes as one-click actions.

use crate::state::AgentId;
use serde::Serialize;

/// A named, fixed sequence of agents
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowPreset {
    /// Workflow name used in URLs and orchestration labels
    pub name: &'static str,
    /// Short description shown to users
    pub description: &'static str,
    /// Agents the workflow invokes, in order
    pub agent_ids: &'static [&'static str],
}

/// All built-in workflow presets
pub const PRESETS: &[WorkflowPreset] = &[
    WorkflowPreset {
        name: "data-onboarding",
        description: "Discover and profile newly connected data sources",
        agent_ids: &["discovery-agent", "quality-agent"],
    },
    WorkflowPreset {
        name: "compliance-check",
        description: "Assess policy adherence and supporting data quality",
        agent_ids: &["policy-agent", "quality-agent"],
    },
    WorkflowPreset {
        name: "impact-analysis",
        description: "Trace dependencies and generate verification queries",
        agent_ids: &["lineage-agent", "sql-agent"],
    },
];

/// Look up a preset by name
pub fn find(name: &str) -> Option<&'static WorkflowPreset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

impl WorkflowPreset {
    /// The preset's agent ids as owned strings, in invocation order
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agent_ids.iter().map(|id| id.to_string()).collect()
    }
}
