//! The tool invocation boundary.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Capability used by `query` tasks.
pub const WEB_SEARCH: &str = "web_search";
/// Capability used by `analyze_repo` tasks.
pub const ANALYZE_REPOSITORY: &str = "analyze_repository";
/// Capability used by `scrape_url` tasks.
pub const SCRAPE_URL: &str = "scrape_url";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    Timeout,
    Unauthorized,
    Unavailable,
    NotFound,
    /// The tool refused the request as malformed.
    Rejected,
    Unknown,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCode::Timeout => write!(f, "timeout"),
            FailureCode::Unauthorized => write!(f, "unauthorized"),
            FailureCode::Unavailable => write!(f, "unavailable"),
            FailureCode::NotFound => write!(f, "not_found"),
            FailureCode::Rejected => write!(f, "rejected"),
            FailureCode::Unknown => write!(f, "unknown"),
        }
    }
}

/// Failure reported by a tool invoker.
#[derive(Error, Debug, Clone)]
#[error("[{code}] {capability}: {message}")]
pub struct ToolError {
    pub capability: String,
    pub code: FailureCode,
    pub message: String,
}

impl ToolError {
    pub fn new(capability: impl Into<String>, code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            code,
            message: message.into(),
        }
    }

    /// Build an error whose code is inferred from the message text.
    pub fn classify(capability: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let m = message.to_lowercase();
        let code = if m.contains("unauthorized") || m.contains("forbidden") || m.contains("401") {
            FailureCode::Unauthorized
        } else if m.contains("not found") || m.contains("404") || m.contains("unknown capability")
        {
            FailureCode::NotFound
        } else if m.contains("timed out") || m.contains("timeout") {
            FailureCode::Timeout
        } else if m.contains("connection") || m.contains("unavailable") || m.contains("503") {
            FailureCode::Unavailable
        } else {
            FailureCode::Unknown
        };
        Self::new(capability, code, message)
    }
}

/// Uniform call shape for every external capability.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, capability: &str, parameters: Value) -> Result<Value, ToolError>;
}

/// Adapts a closure into a [`ToolInvoker`].
pub struct FnInvoker<F> {
    f: F,
}

impl<F> FnInvoker<F>
where
    F: Fn(&str, Value) -> Result<Value, ToolError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> ToolInvoker for FnInvoker<F>
where
    F: Fn(&str, Value) -> Result<Value, ToolError> + Send + Sync,
{
    async fn invoke(&self, capability: &str, parameters: Value) -> Result<Value, ToolError> {
        (self.f)(capability, parameters)
    }
}
