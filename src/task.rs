//! Task model: typed task kinds, monotonic status, and captured failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use thiserror::Error;

use crate::error::Error;
use crate::tools::ToolError;

/// Task identifier (ULID).
pub type TaskId = String;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl TaskStatus {
    fn rank(self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Running => 1,
            TaskStatus::Completed | TaskStatus::Error => 2,
        }
    }

    /// Whether the status is final.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Error => write!(f, "error"),
        }
    }
}

/// Task kinds with a registered handler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Query,
    AnalyzeRepo,
    ScrapeUrl,
    ProcessSearchResults,
    Memory,
    CallFunction,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::Query,
        TaskKind::AnalyzeRepo,
        TaskKind::ScrapeUrl,
        TaskKind::ProcessSearchResults,
        TaskKind::Memory,
        TaskKind::CallFunction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Query => "query",
            TaskKind::AnalyzeRepo => "analyze_repo",
            TaskKind::ScrapeUrl => "scrape_url",
            TaskKind::ProcessSearchResults => "process_search_results",
            TaskKind::Memory => "memory",
            TaskKind::CallFunction => "call_function",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidTaskType(s.to_string()))
    }
}

/// Failure captured while running a task.
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unrecognized task type '{0}'")]
    UnknownType(String),

    #[error("tool invocation failed: {0}")]
    Tool(#[from] ToolError),

    #[error("{0}")]
    Handler(String),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl TaskError {
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "validation",
            TaskError::UnknownType(_) => "unknown_type",
            TaskError::Tool(_) => "tool",
            TaskError::Handler(_) => "handler",
            TaskError::Panicked(_) => "panicked",
        }
    }

    /// Result payload recorded on an errored task.
    pub fn to_result(&self) -> Value {
        let mut result = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let TaskError::Tool(tool) = self {
            result["tool"] = json!({
                "capability": tool.capability,
                "code": tool.code.to_string(),
                "message": tool.message,
            });
        }
        result
    }
}

/// A unit of work owned by one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub agent_id: String,
    pub task_type: String,
    pub payload: Value,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(agent_id: impl Into<String>, task_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            agent_id: agent_id.into(),
            task_type: task_type.into(),
            payload,
            status: TaskStatus::Pending,
            result: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Resolve the task type against the handler kinds.
    pub fn kind(&self) -> Result<TaskKind, Error> {
        self.task_type.parse()
    }

    fn transition(&mut self, to: TaskStatus) -> Result<(), Error> {
        if self.status.is_terminal() || to.rank() <= self.status.rank() {
            return Err(Error::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    pub fn mark_running(&mut self) -> Result<(), Error> {
        self.transition(TaskStatus::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn complete(&mut self, result: Value) -> Result<(), Error> {
        self.transition(TaskStatus::Completed)?;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, error: &TaskError) -> Result<(), Error> {
        self.transition(TaskStatus::Error)?;
        self.result = Some(error.to_result());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Error message recorded on a failed task.
    pub fn error_message(&self) -> Option<&str> {
        if self.status != TaskStatus::Error {
            return None;
        }
        self.result.as_ref()?.get("error")?.as_str()
    }
}
