//! agentweave library root.

pub mod agent;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod memory;
pub mod protocol;
pub mod task;
pub mod tools;

pub use agent::{AgentId, AgentInfo, AgentStatus, HandlerTable, TaskContext, TaskHandler};
pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use core::{Orchestrator, Registry};
pub use error::{Error, Result};
pub use memory::{MemoryEntry, MemoryStats, SharedMemoryStore};
pub use protocol::{Envelope, MessageKind};
pub use task::{Task, TaskError, TaskId, TaskKind, TaskStatus};
pub use tools::{FailureCode, ToolError, ToolInvoker};
