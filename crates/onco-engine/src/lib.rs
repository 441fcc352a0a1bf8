//! Workflow orchestration: one `run` drives retrieval, statistics,
//! synthesis, gate review and the audit commit.

pub mod config;
pub mod narrative;
pub mod orchestrator;

pub use config::EngineConfig;
pub use narrative::NarrativeClient;
pub use orchestrator::{Orchestrator, RunInput, WorkflowError};
