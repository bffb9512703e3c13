//! Simulated agent execution
//!
//! `run` acknowledges immediately and advances the agent's progress on a
//! background task; `stop` cancels that task before resetting state, so a
//! stopped agent can never advance afterwards. No real work is performed —
//! params are accepted and echoed, never interpreted.

use crate::config::SimulationConfig;
use crate::error::AppError;
use crate::events::{AgentEvent, EVENT_CHANNEL_CAPACITY};
use crate::state::{AgentId, AgentOutcome, AgentStatus, AppState};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Immediate acknowledgement of a `run` call
///
/// Returned before the simulated work completes — callers observe the final
/// result through the registry or the event stream, never synchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAck {
    /// Whether the run was started
    pub success: bool,
    /// ID of the agent that was started
    pub agent_id: AgentId,
    /// The params passed to `run`, echoed back unchanged
    pub params: Value,
}

/// Simulates execution of one or more agents
///
/// Owns the in-flight tick tasks keyed by agent ID. Shared state is only
/// touched under the registry write lock, and the lock is never held across
/// an await.
pub struct Orchestrator {
    state: Arc<RwLock<AppState>>,
    events: broadcast::Sender<AgentEvent>,
    tasks: Mutex<HashMap<AgentId, JoinHandle<()>>>,
    sim: SimulationConfig,
}

impl Orchestrator {
    /// Create an orchestrator over the given application state
    pub fn new(state: Arc<RwLock<AppState>>, sim: SimulationConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state,
            events,
            tasks: Mutex::new(HashMap::new()),
            sim: SimulationConfig {
                tick: sim.tick,
                // A zero increment would tick forever
                increment: sim.increment.max(1),
            },
        }
    }

    /// The shared application state this orchestrator mutates
    pub fn state(&self) -> &Arc<RwLock<AppState>> {
        &self.state
    }

    /// Subscribe to agent lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    /// Start a simulated run of the given agent
    ///
    /// Transitions the agent to running with progress 0 and spawns the tick
    /// task, then returns an acknowledgement without waiting for completion.
    /// Unknown agents are `AgentNotFound`; agents already running are
    /// `AgentBusy` instead of being silently restarted.
    pub async fn run(&self, id: &str, params: Value) -> Result<RunAck, AppError> {
        let category = {
            let mut state = self.state.write().await;
            let agent = state
                .registry
                .get_mut(id)
                .ok_or_else(|| AppError::AgentNotFound(id.to_string()))?;

            if agent.status == AgentStatus::Running {
                return Err(AppError::AgentBusy(id.to_string()));
            }

            agent.status = AgentStatus::Running;
            agent.progress = Some(0);
            agent.outcome = None;
            agent.category
        };

        let workflow = params
            .get("workflow")
            .and_then(Value::as_str)
            .map(String::from);

        info!(agent_id = %id, workflow = ?workflow, "Agent run started");
        let _ = self.events.send(AgentEvent::Started {
            agent_id: id.to_string(),
            workflow,
        });

        let handle = self.spawn_ticker(id.to_string(), category);
        self.tasks.lock().await.insert(id.to_string(), handle);

        Ok(RunAck {
            success: true,
            agent_id: id.to_string(),
            params,
        })
    }

    /// Stop an agent and reset it to idle with zero progress
    ///
    /// The tick task is aborted before the reset, so a pending tick cannot
    /// resurrect the agent's progress. Idempotent on idle agents; keeps
    /// `last_run` from earlier completed runs.
    pub async fn stop(&self, id: &str) -> Result<(), AppError> {
        if let Some(handle) = self.tasks.lock().await.remove(id) {
            handle.abort();
        }

        {
            let mut state = self.state.write().await;
            if !state.registry.set_status(id, AgentStatus::Idle, Some(0)) {
                return Err(AppError::AgentNotFound(id.to_string()));
            }
        }

        info!(agent_id = %id, "Agent stopped");
        let _ = self.events.send(AgentEvent::Stopped {
            agent_id: id.to_string(),
        });
        Ok(())
    }

    /// Run several agents in sequence for a named workflow
    ///
    /// Awaits each run's immediate acknowledgement (not its completion)
    /// before issuing the next, so agents start in order but their simulated
    /// progress proceeds concurrently. Unknown and busy agents are skipped.
    pub async fn orchestrate(&self, agent_ids: &[AgentId], workflow: &str) -> Vec<RunAck> {
        info!(workflow = %workflow, agents = ?agent_ids, "Orchestrating agents");

        let mut acks = Vec::new();
        for id in agent_ids {
            let params = serde_json::json!({ "workflow": workflow });
            match self.run(id, params).await {
                Ok(ack) => acks.push(ack),
                Err(AppError::AgentNotFound(_)) => {
                    debug!(agent_id = %id, workflow = %workflow, "Skipping unknown agent");
                }
                Err(AppError::AgentBusy(_)) => {
                    warn!(agent_id = %id, workflow = %workflow, "Skipping busy agent");
                }
                Err(e) => {
                    warn!(agent_id = %id, error = %e, "Agent failed to start");
                }
            }
        }
        acks
    }

    /// Current status of an agent, if it exists
    pub async fn status(&self, id: &str) -> Option<AgentStatus> {
        self.state.read().await.registry.status(id)
    }

    /// Spawn the background task that advances an agent's progress
    fn spawn_ticker(
        &self,
        agent_id: AgentId,
        category: crate::state::AgentCategory,
    ) -> JoinHandle<()> {
        let state = self.state.clone();
        let events = self.events.clone();
        let sim = self.sim;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(sim.tick).await;

                let event = {
                    let mut state = state.write().await;
                    let Some(agent) = state.registry.get_mut(&agent_id) else {
                        break;
                    };
                    // A stop between ticks resets the status; bail out
                    if agent.status != AgentStatus::Running {
                        break;
                    }

                    let progress = agent
                        .progress
                        .unwrap_or(0)
                        .saturating_add(sim.increment)
                        .min(100);
                    agent.progress = Some(progress);

                    if progress == 100 {
                        agent.status = AgentStatus::Completed;
                        agent.last_run = Some(Utc::now());
                        let outcome = AgentOutcome::simulated(category);
                        agent.outcome = Some(outcome.clone());
                        AgentEvent::Completed {
                            agent_id: agent_id.clone(),
                            outcome,
                        }
                    } else {
                        AgentEvent::Progress {
                            agent_id: agent_id.clone(),
                            progress,
                        }
                    }
                };

                let done = event.is_terminal();
                let _ = events.send(event);
                if done {
                    debug!(agent_id = %agent_id, "Agent run completed");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_orchestrator() -> Orchestrator {
        let state = Arc::new(RwLock::new(AppState::new()));
        // Fast cadence so completion takes four ticks
        let sim = SimulationConfig {
            tick: Duration::from_millis(5),
            increment: 25,
        };
        Orchestrator::new(state, sim)
    }

    async fn wait_for_status(
        orchestrator: &Orchestrator,
        id: &str,
        expected: AgentStatus,
    ) -> bool {
        for _ in 0..200 {
            if orchestrator.status(id).await == Some(expected) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_run_transitions_to_running_immediately() {
        let orchestrator = test_orchestrator();
        let ack = orchestrator
            .run("lineage-agent", Value::Null)
            .await
            .unwrap();

        assert!(ack.success);
        assert_eq!(ack.agent_id, "lineage-agent");
        assert_eq!(
            orchestrator.status("lineage-agent").await,
            Some(AgentStatus::Running)
        );

        let state = orchestrator.state().read().await;
        assert_eq!(state.registry.get("lineage-agent").unwrap().progress, Some(0));
    }

    #[tokio::test]
    async fn test_run_completes_with_full_progress() {
        let orchestrator = test_orchestrator();
        orchestrator.run("quality-agent", Value::Null).await.unwrap();

        assert!(wait_for_status(&orchestrator, "quality-agent", AgentStatus::Completed).await);

        let state = orchestrator.state().read().await;
        let agent = state.registry.get("quality-agent").unwrap();
        assert_eq!(agent.progress, Some(100));
        assert!(agent.last_run.is_some());
        assert!(matches!(
            agent.outcome,
            Some(AgentOutcome::QualityReport { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_unknown_agent_is_typed_error() {
        let orchestrator = test_orchestrator();
        let before = orchestrator.state().read().await.registry.len();

        let result = orchestrator.run("nonexistent", Value::Null).await;
        assert!(matches!(result, Err(AppError::AgentNotFound(_))));

        let state = orchestrator.state().read().await;
        assert_eq!(state.registry.len(), before);
        for agent in state.registry.list() {
            assert_eq!(agent.status, AgentStatus::Idle);
        }
    }

    #[tokio::test]
    async fn test_run_while_running_is_busy() {
        let orchestrator = test_orchestrator();
        orchestrator.run("sql-agent", Value::Null).await.unwrap();

        let result = orchestrator.run("sql-agent", Value::Null).await;
        assert!(matches!(result, Err(AppError::AgentBusy(_))));
    }

    #[tokio::test]
    async fn test_rerun_after_completion() {
        let orchestrator = test_orchestrator();
        orchestrator.run("sql-agent", Value::Null).await.unwrap();
        assert!(wait_for_status(&orchestrator, "sql-agent", AgentStatus::Completed).await);

        // Completed agents can be run again
        let ack = orchestrator.run("sql-agent", Value::Null).await;
        assert!(ack.is_ok());
    }

    #[tokio::test]
    async fn test_stop_cancels_the_tick_task() {
        let orchestrator = test_orchestrator();
        orchestrator.run("policy-agent", Value::Null).await.unwrap();
        orchestrator.stop("policy-agent").await.unwrap();

        assert_eq!(
            orchestrator.status("policy-agent").await,
            Some(AgentStatus::Idle)
        );

        // Wait several tick periods; a leaked timer would advance progress
        tokio::time::sleep(Duration::from_millis(50)).await;
        let state = orchestrator.state().read().await;
        let agent = state.registry.get("policy-agent").unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.progress, Some(0));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_on_idle_agent() {
        let orchestrator = test_orchestrator();
        orchestrator.stop("discovery-agent").await.unwrap();
        orchestrator.stop("discovery-agent").await.unwrap();

        let state = orchestrator.state().read().await;
        let agent = state.registry.get("discovery-agent").unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.progress, Some(0));
    }

    #[tokio::test]
    async fn test_stop_unknown_agent_is_typed_error() {
        let orchestrator = test_orchestrator();
        let result = orchestrator.stop("nonexistent").await;
        assert!(matches!(result, Err(AppError::AgentNotFound(_))));
    }

    #[tokio::test]
    async fn test_orchestrate_acks_in_order() {
        let orchestrator = test_orchestrator();
        let ids = vec!["policy-agent".to_string(), "quality-agent".to_string()];

        let acks = orchestrator.orchestrate(&ids, "compliance-check").await;

        assert_eq!(acks.len(), 2);
        assert_eq!(acks[0].agent_id, "policy-agent");
        assert_eq!(acks[1].agent_id, "quality-agent");
        assert_eq!(acks[0].params["workflow"], "compliance-check");
    }

    #[tokio::test]
    async fn test_orchestrate_skips_unknown_agents() {
        let orchestrator = test_orchestrator();
        let ids = vec![
            "ghost-agent".to_string(),
            "lineage-agent".to_string(),
        ];

        let acks = orchestrator.orchestrate(&ids, "impact-analysis").await;

        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].agent_id, "lineage-agent");
    }

    #[tokio::test]
    async fn test_events_bracket_the_run() {
        let orchestrator = test_orchestrator();
        let mut events = orchestrator.subscribe();

        orchestrator.run("lineage-agent", Value::Null).await.unwrap();

        let first = events.recv().await.unwrap();
        assert!(matches!(first, AgentEvent::Started { .. }));

        let mut last = first;
        while !last.is_terminal() {
            last = events.recv().await.unwrap();
        }
        assert!(matches!(last, AgentEvent::Completed { .. }));
        assert_eq!(last.agent_id(), "lineage-agent");
    }
}
