//! Handles a task handler gets for the agent it runs on.

use serde_json::Value;
use std::sync::{Arc, Weak};

use crate::core::Registry;
use crate::error::{Error, Result};
use crate::memory::SharedMemoryStore;
use crate::protocol::Envelope;
use crate::tools::ToolInvoker;

use super::AgentId;

#[derive(Clone)]
pub struct TaskContext {
    pub agent_id: AgentId,
    pub memory: Arc<SharedMemoryStore>,
    pub tools: Arc<dyn ToolInvoker>,
    // Weak: the registry owns the agent handles, and through them this worker.
    registry: Weak<Registry>,
}

impl TaskContext {
    pub(crate) fn new(
        agent_id: AgentId,
        memory: Arc<SharedMemoryStore>,
        tools: Arc<dyn ToolInvoker>,
        registry: Weak<Registry>,
    ) -> Self {
        Self {
            agent_id,
            memory,
            tools,
            registry,
        }
    }

    fn registry(&self) -> Result<Arc<Registry>> {
        self.registry
            .upgrade()
            .ok_or_else(|| Error::AgentNotFound(self.agent_id.clone()))
    }

    /// Send a message from this agent to a connected peer.
    pub async fn send_message(&self, to: &str, content: Value) -> Result<String> {
        self.registry()?
            .route(Envelope::new(self.agent_id.clone(), to, content))
            .await
    }

    /// Reply to an envelope this agent received.
    pub async fn reply(&self, to: &Envelope, content: Value) -> Result<String> {
        self.registry()?.route(to.reply(content)).await
    }

    /// Drain up to `max` messages from this agent's inbox.
    pub async fn receive_messages(&self, max: usize) -> Result<Vec<Envelope>> {
        let handle = self.registry()?.handle(&self.agent_id).await?;
        Ok(handle.drain_inbox(max).await)
    }
}
