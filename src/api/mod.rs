//! API module
//!
//! Contains HTTP request handlers for the governance backend endpoints.

pub mod agents;
pub mod assistant;
pub mod chat;
pub mod orchestrate;
pub mod policy;

use crate::config::Config;
use crate::error::AppError;
use crate::orchestrator::Orchestrator;
use crate::services::policy::PolicyStore;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum query length in characters
pub const MAX_QUERY_LENGTH: usize = 10_000; // 10KB max query length

/// Everything the HTTP handlers need, cloned per request
#[derive(Clone)]
pub struct RouterState {
    /// Agent orchestrator (owns the shared registry state)
    pub orchestrator: Arc<Orchestrator>,
    /// Policy document store
    pub policies: Arc<RwLock<PolicyStore>>,
    /// Shared HTTP client for upstream API calls
    pub http: reqwest::Client,
    /// Application configuration
    pub config: Arc<Config>,
}

/// Validate query string
///
/// # Returns
/// * `Ok(())` - Query is valid
/// * `Err(AppError)` - Query is invalid (empty or too long)
pub fn validate_query(query: &str) -> Result<(), AppError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest("Query cannot be empty".to_string()));
    }
    if trimmed.len() > MAX_QUERY_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "Query exceeds maximum length of {} characters",
            MAX_QUERY_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::state::AppState;
    use std::time::Duration;

    /// Router state over a freshly seeded registry with a fast simulation
    pub fn router_state() -> RouterState {
        router_state_with_config(Config::from_env())
    }

    /// Router state with explicit configuration (tests that hit mock servers)
    pub fn router_state_with_config(config: Config) -> RouterState {
        let state = Arc::new(RwLock::new(AppState::new()));
        let sim = SimulationConfig {
            tick: Duration::from_millis(5),
            increment: 25,
        };
        RouterState {
            orchestrator: Arc::new(Orchestrator::new(state, sim)),
            policies: Arc::new(RwLock::new(PolicyStore::new())),
            http: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }
}
