//! Intent classification for free-text governance queries
//!
//! Maps user input to an intent label and an ordered list of agents to
//! invoke. Classification is an ordered rule table evaluated in priority
//! order with first-match-wins semantics: each rule is a set of
//! case-insensitive substrings, the intent it signals, and the agents it
//! selects. Rule order is a policy decision — compliance/policy terms are
//! checked before everything else, and the combined compliance-audit rule
//! is only reachable through "audit" because "compliance" already matches
//! the policy rule.

use crate::state::AgentId;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The classified purpose of a user query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    /// Policy and regulatory questions
    Policy,
    /// Data quality questions
    Quality,
    /// Lineage and dependency questions
    Lineage,
    /// SQL generation requests
    Sql,
    /// Data discovery and catalog questions
    Discovery,
    /// Combined multi-agent compliance audit
    ComplianceAudit,
    /// Anything that matches no rule
    General,
}

impl Intent {
    /// The intent's wire label, also used as an orchestration workflow label
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Policy => "policy",
            Intent::Quality => "quality",
            Intent::Lineage => "lineage",
            Intent::Sql => "sql",
            Intent::Discovery => "discovery",
            Intent::ComplianceAudit => "compliance-audit",
            Intent::General => "general",
        }
    }
}

/// Contextual parameters passed along with a classification
///
/// Carries the original query plus the intent-specific flags the matching
/// rule sets; unrelated flags stay unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    /// The original query text
    pub query: String,
    /// Policy intents require a compliance assessment
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_compliance: bool,
    /// Quality intents name the metrics to evaluate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
    /// Lineage intents include downstream dependencies
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_downstream: bool,
}

/// Result of classifying a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The matched intent
    pub intent: Intent,
    /// Agents to invoke, in order
    pub agent_ids: Vec<AgentId>,
    /// Query text and intent-specific flags
    pub context: QueryContext,
}

/// A single classification rule
struct IntentRule {
    /// Substrings that trigger this rule (case-insensitive)
    keywords: &'static [&'static str],
    /// Intent the rule signals
    intent: Intent,
    /// Agents the rule selects, in invocation order
    agents: &'static [&'static str],
}

/// The rule table, in priority order
static RULES: Lazy<Vec<IntentRule>> = Lazy::new(|| {
    vec![
        IntentRule {
            keywords: &["policy", "compliance", "regulation"],
            intent: Intent::Policy,
            agents: &["policy-agent"],
        },
        IntentRule {
            keywords: &["quality", "completeness", "accuracy"],
            intent: Intent::Quality,
            agents: &["quality-agent"],
        },
        IntentRule {
            keywords: &["lineage", "dependency", "impact"],
            intent: Intent::Lineage,
            agents: &["lineage-agent"],
        },
        IntentRule {
            keywords: &["sql", "query", "select"],
            intent: Intent::Sql,
            agents: &["sql-agent"],
        },
        IntentRule {
            keywords: &["discover", "catalog", "find"],
            intent: Intent::Discovery,
            agents: &["discovery-agent"],
        },
        IntentRule {
            keywords: &["compliance check", "audit"],
            intent: Intent::ComplianceAudit,
            agents: &["policy-agent", "quality-agent", "lineage-agent"],
        },
    ]
});

/// Classify a free-text query
///
/// Walks the rule table in order and stops at the first rule whose keyword
/// set matches; no scoring, no multi-label combination beyond the explicit
/// compliance-audit rule. Queries matching nothing fall back to
/// `Intent::General` with an empty agent list.
pub fn classify(query: &str) -> Classification {
    let normalized = query.to_lowercase();

    for rule in RULES.iter() {
        if rule.keywords.iter().any(|kw| normalized.contains(kw)) {
            return Classification {
                intent: rule.intent,
                agent_ids: rule.agents.iter().map(|a| a.to_string()).collect(),
                context: context_for(rule.intent, query),
            };
        }
    }

    Classification {
        intent: Intent::General,
        agent_ids: Vec::new(),
        context: QueryContext {
            query: query.to_string(),
            ..Default::default()
        },
    }
}

/// Build the intent-specific context for a matched rule
fn context_for(intent: Intent, query: &str) -> QueryContext {
    let mut context = QueryContext {
        query: query.to_string(),
        ..Default::default()
    };
    match intent {
        Intent::Policy => context.requires_compliance = true,
        Intent::Quality => {
            context.metrics = vec![
                "completeness".to_string(),
                "accuracy".to_string(),
                "timeliness".to_string(),
            ];
        }
        Intent::Lineage => context.include_downstream = true,
        _ => {}
    }
    context
}

/// Follow-up suggestions shown to the user after a reply of the given intent
pub fn suggestions(intent: Intent) -> Vec<&'static str> {
    match intent {
        Intent::Policy => vec![
            "Show me GDPR compliance status",
            "Which data needs encryption?",
            "List all retention policies",
        ],
        Intent::Quality => vec![
            "Run completeness check",
            "Show accuracy metrics",
            "Find duplicate records",
        ],
        Intent::Lineage => vec![
            "Show impact analysis",
            "Find downstream dependencies",
            "Map data sources",
        ],
        Intent::Sql => vec![
            "Optimize this query",
            "Show execution plan",
            "Generate report query",
        ],
        _ => vec![
            "How do I check data quality?",
            "What policies apply to my data?",
            "Show me data lineage",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_query() {
        let result = classify("What are the GDPR compliance requirements?");
        assert_eq!(result.intent, Intent::Policy);
        assert!(result.agent_ids.contains(&"policy-agent".to_string()));
        assert!(result.context.requires_compliance);
        assert!(!result.context.include_downstream);
    }

    #[test]
    fn test_sql_query() {
        let result = classify("Generate SQL for the trade report");
        assert_eq!(result.intent, Intent::Sql);
        assert_eq!(result.agent_ids, vec!["sql-agent".to_string()]);
    }

    #[test]
    fn test_no_match_falls_back_to_general() {
        let result = classify("hello");
        assert_eq!(result.intent, Intent::General);
        assert!(result.agent_ids.is_empty());
        assert_eq!(result.context.query, "hello");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let result = classify("Show me the data LINEAGE for trades");
        assert_eq!(result.intent, Intent::Lineage);
        assert!(result.context.include_downstream);
    }

    #[test]
    fn test_quality_context_carries_metrics() {
        let result = classify("Check completeness of the positions feed");
        assert_eq!(result.intent, Intent::Quality);
        assert_eq!(
            result.context.metrics,
            vec!["completeness", "accuracy", "timeliness"]
        );
    }

    #[test]
    fn test_first_match_wins_over_later_rules() {
        // "policy" (rule 1) beats "query" (rule 4) regardless of position
        let result = classify("Write a query listing every policy owner");
        assert_eq!(result.intent, Intent::Policy);
    }

    #[test]
    fn test_compliance_check_hits_policy_rule_first() {
        // "compliance check" contains "compliance", so the policy rule wins;
        // the combined rule is only reachable through "audit"
        let result = classify("Run a compliance check on trades");
        assert_eq!(result.intent, Intent::Policy);
    }

    #[test]
    fn test_audit_reaches_compliance_audit_rule() {
        let result = classify("Prepare the annual audit");
        assert_eq!(result.intent, Intent::ComplianceAudit);
        assert_eq!(
            result.agent_ids,
            vec![
                "policy-agent".to_string(),
                "quality-agent".to_string(),
                "lineage-agent".to_string(),
            ]
        );
    }

    #[test]
    fn test_discovery_keywords() {
        let result = classify("Help me catalog the new warehouse tables");
        assert_eq!(result.intent, Intent::Discovery);
        assert_eq!(result.agent_ids, vec!["discovery-agent".to_string()]);
    }

    #[test]
    fn test_intent_serializes_kebab_case() {
        let json = serde_json::to_value(Intent::ComplianceAudit).unwrap();
        assert_eq!(json, "compliance-audit");
    }
}
