// State management module
// Handles application state, the agent registry, and typed agent outcomes

pub mod outcome;
pub mod registry;

pub use outcome::AgentOutcome;
pub use registry::{Agent, AgentCategory, AgentId, AgentRegistry, AgentStatus};

/// Main application state
///
/// Owns the agent registry. Created once in `main` and shared behind
/// `Arc<RwLock<AppState>>` — the registry has a single root owner instead of
/// module-global mutable state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Registry of all agents
    pub registry: AgentRegistry,
}

impl AppState {
    /// Create application state with the built-in agent seed list
    pub fn new() -> Self {
        Self {
            registry: AgentRegistry::with_defaults(),
        }
    }

    /// Create application state with an empty registry (tests)
    pub fn empty() -> Self {
        Self::default()
    }
}
