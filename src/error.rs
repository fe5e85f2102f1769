//! Error types for agentweave.
//!
//! These are the structural errors returned synchronously by orchestrator
//! calls. Failures that happen while a task runs never surface here; they are
//! recorded on the task itself (see [`crate::task::TaskError`]).

use thiserror::Error;

use crate::task::TaskStatus;
use crate::tools::ToolError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent {from} is not connected to {to}")]
    NotConnected { from: String, to: String },

    #[error("Unrecognized task type: {0}")]
    InvalidTaskType(String),

    #[error("Tool invocation failed: {0}")]
    ToolInvocation(#[from] ToolError),

    #[error("Memory key not found: {0}")]
    MemoryKeyNotFound(String),

    #[error("Invalid task transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
