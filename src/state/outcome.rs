// Typed agent run results
// One variant per agent category, replacing loosely-typed result payloads

use crate::state::registry::AgentCategory;
use serde::{Deserialize, Serialize};

/// Result payload of a completed agent run
///
/// Tagged union keyed by agent category; each variant carries its own
/// well-typed fields instead of an arbitrary per-agent map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// Regulatory findings from the policy agent
    PolicyFindings {
        /// Regulations that apply to the analyzed scope
        policies: Vec<String>,
        /// Overall compliance score (percent)
        compliance_score: f64,
        /// Suggested remediation steps
        recommendations: Vec<String>,
    },
    /// Quality assessment from the quality agent
    QualityReport {
        /// Overall quality score (percent)
        quality_score: f64,
        /// Detected quality issues
        issues: Vec<String>,
        /// Tables affected by the issues
        affected_tables: Vec<String>,
    },
    /// Dependency summary from the lineage agent
    LineageSummary {
        /// Number of upstream dependencies found
        upstream_count: u32,
        /// Number of downstream systems affected
        downstream_count: u32,
        /// Systems on the critical data path
        critical_path: Vec<String>,
    },
    /// Generated query from the SQL agent
    SqlGeneration {
        /// The generated SQL text
        sql: String,
        /// Estimated result row count
        estimated_rows: u64,
        /// Estimated execution time, as a display string
        execution_time: String,
    },
    /// Catalog scan results from the discovery agent
    DiscoveryReport {
        /// Newly discovered tables
        new_tables: u32,
        /// Columns flagged as potential PII
        pii_columns: u32,
        /// Suggested classification labels
        classification_suggestions: Vec<String>,
    },
    /// Fallback for categories without a specialised simulation
    Generic {
        /// Human-readable completion message
        message: String,
    },
}

impl AgentOutcome {
    /// The simulated outcome for an agent of the given category
    ///
    /// No real work is performed anywhere in the system; these are the fixed
    /// payloads a completed run reports.
    pub fn simulated(category: AgentCategory) -> Self {
        match category {
            AgentCategory::Policy => AgentOutcome::PolicyFindings {
                policies: vec![
                    "MiFID II".to_string(),
                    "GDPR".to_string(),
                    "SOX".to_string(),
                ],
                compliance_score: 94.2,
                recommendations: vec![
                    "Enable data masking".to_string(),
                    "Update retention policy".to_string(),
                ],
            },
            AgentCategory::Quality => AgentOutcome::QualityReport {
                quality_score: 87.3,
                issues: vec![
                    "Missing timestamps".to_string(),
                    "Duplicate records".to_string(),
                ],
                affected_tables: vec![
                    "trade_orders".to_string(),
                    "client_positions".to_string(),
                ],
            },
            AgentCategory::Lineage => AgentOutcome::LineageSummary {
                upstream_count: 12,
                downstream_count: 8,
                critical_path: vec![
                    "Trading System".to_string(),
                    "Risk Engine".to_string(),
                    "Regulatory Reports".to_string(),
                ],
            },
            AgentCategory::Sql => AgentOutcome::SqlGeneration {
                sql: "SELECT t.trade_id, t.trade_date, c.client_name\n\
                      FROM trades t\n\
                      JOIN clients c ON t.client_id = c.client_id\n\
                      WHERE t.trade_date >= '2024-01-01'"
                    .to_string(),
                estimated_rows: 15_420,
                execution_time: "0.3s".to_string(),
            },
            AgentCategory::Discovery => AgentOutcome::DiscoveryReport {
                new_tables: 47,
                pii_columns: 8,
                classification_suggestions: vec![
                    "Confidential".to_string(),
                    "Internal".to_string(),
                    "Public".to_string(),
                ],
            },
            AgentCategory::Compliance => AgentOutcome::Generic {
                message: "Compliance review completed".to_string(),
            },
        }
    }
}
