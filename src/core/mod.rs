//! Core module - agent registry and the orchestrator built on it.
//!
//! - Agent registry with the connection graph
//! - Message routing along connections
//! - Orchestrator API: lifecycle, tasks, and shared memory

pub mod orchestrator;
pub mod registry;

pub use orchestrator::Orchestrator;
pub use registry::Registry;
