//! Agent orchestration
//!
//! Simulated execution of governance agents: fire-and-forget runs with
//! cancellable progress ticking, sequential multi-agent workflows, and the
//! named workflow presets.

pub mod runner;
pub mod workflows;

pub use runner::{Orchestrator, RunAck};
pub use workflows::WorkflowPreset;
