//! Execution contracts for tool calls: timeout, retries, and failure codes.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ToolSettings;

use super::invoker::{FailureCode, ToolError, ToolInvoker};

#[derive(Debug, Clone)]
pub struct ExecutionContract {
    pub timeout: Duration,
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ExecutionContract {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            retries: 1,
            retry_backoff: Duration::from_millis(600),
        }
    }
}

impl ExecutionContract {
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_seconds),
            retries: settings.retries,
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
        }
    }
}

/// Wraps an invoker so every call obeys an [`ExecutionContract`].
pub struct ContractInvoker {
    inner: Arc<dyn ToolInvoker>,
    contract: ExecutionContract,
}

impl ContractInvoker {
    pub fn new(inner: Arc<dyn ToolInvoker>, contract: ExecutionContract) -> Self {
        Self { inner, contract }
    }
}

fn is_retryable(code: FailureCode) -> bool {
    matches!(code, FailureCode::Timeout | FailureCode::Unavailable | FailureCode::Unknown)
}

#[async_trait]
impl ToolInvoker for ContractInvoker {
    async fn invoke(&self, capability: &str, parameters: Value) -> Result<Value, ToolError> {
        let attempts = self.contract.retries + 1;
        let mut last_error: Option<ToolError> = None;

        for attempt in 1..=attempts {
            let call = self.inner.invoke(capability, parameters.clone());
            match tokio::time::timeout(self.contract.timeout, call).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    tracing::warn!(
                        capability,
                        attempt,
                        attempts,
                        code = %e.code,
                        "Tool attempt failed: {}",
                        e.message
                    );
                    let retryable = is_retryable(e.code);
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
                Err(_) => {
                    tracing::warn!(capability, attempt, attempts, "Tool attempt timed out");
                    last_error = Some(ToolError::new(
                        capability,
                        FailureCode::Timeout,
                        format!("call exceeded timeout of {:?}", self.contract.timeout),
                    ));
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.contract.retry_backoff).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ToolError::new(capability, FailureCode::Unknown, "call failed for unknown reason")
        }))
    }
}
