//! Agent registry and connection graph.
//!
//! One lock covers both the agent map and every agent's connection set, so
//! structural changes (insert, remove, connect, disconnect) are serialized.
//! Routing only reads the registry; it clones the recipient's handle and
//! releases the lock before touching the recipient's inbox.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::agent::{AgentHandle, AgentId, AgentInfo};
use crate::error::{Error, Result};
use crate::protocol::Envelope;

struct AgentEntry {
    handle: Arc<AgentHandle>,
    /// Agents this agent may message.
    connections: BTreeSet<AgentId>,
}

#[derive(Default)]
pub struct Registry {
    agents: RwLock<HashMap<AgentId, AgentEntry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, handle: Arc<AgentHandle>) {
        let mut agents = self.agents.write().await;
        agents.insert(
            handle.id.clone(),
            AgentEntry {
                handle,
                connections: BTreeSet::new(),
            },
        );
    }

    /// Remove an agent along with every edge that mentions it.
    pub(crate) async fn remove(&self, id: &str) -> Result<Arc<AgentHandle>> {
        let mut agents = self.agents.write().await;
        let entry = agents
            .remove(id)
            .ok_or_else(|| Error::AgentNotFound(id.to_string()))?;
        for other in agents.values_mut() {
            other.connections.remove(id);
        }
        Ok(entry.handle)
    }

    pub(crate) async fn drain(&self) -> Vec<Arc<AgentHandle>> {
        let mut agents = self.agents.write().await;
        agents.drain().map(|(_, entry)| entry.handle).collect()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.agents.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }

    pub(crate) async fn handle(&self, id: &str) -> Result<Arc<AgentHandle>> {
        self.agents
            .read()
            .await
            .get(id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| Error::AgentNotFound(id.to_string()))
    }

    /// Add the edge `from -> to`, and `to -> from` when `both` is set.
    pub async fn connect(&self, from: &str, to: &str, both: bool) -> Result<()> {
        let mut agents = self.agents.write().await;
        for id in [from, to] {
            if !agents.contains_key(id) {
                return Err(Error::AgentNotFound(id.to_string()));
            }
        }
        if let Some(entry) = agents.get_mut(from) {
            entry.connections.insert(to.to_string());
        }
        if both {
            if let Some(entry) = agents.get_mut(to) {
                entry.connections.insert(from.to_string());
            }
        }
        Ok(())
    }

    /// Remove the edge `from -> to`, and `to -> from` when `both` is set.
    /// Missing edges are not an error.
    pub async fn disconnect(&self, from: &str, to: &str, both: bool) -> Result<()> {
        let mut agents = self.agents.write().await;
        for id in [from, to] {
            if !agents.contains_key(id) {
                return Err(Error::AgentNotFound(id.to_string()));
            }
        }
        if let Some(entry) = agents.get_mut(from) {
            entry.connections.remove(to);
        }
        if both {
            if let Some(entry) = agents.get_mut(to) {
                entry.connections.remove(from);
            }
        }
        Ok(())
    }

    pub async fn is_connected(&self, from: &str, to: &str) -> bool {
        self.agents
            .read()
            .await
            .get(from)
            .is_some_and(|entry| entry.connections.contains(to))
    }

    pub async fn connections(&self, id: &str) -> Result<BTreeSet<AgentId>> {
        self.agents
            .read()
            .await
            .get(id)
            .map(|entry| entry.connections.clone())
            .ok_or_else(|| Error::AgentNotFound(id.to_string()))
    }

    /// Validate and deliver an envelope. Returns the envelope id.
    pub async fn route(&self, envelope: Envelope) -> Result<String> {
        let recipient = {
            let agents = self.agents.read().await;
            let sender = agents
                .get(&envelope.from_agent)
                .ok_or_else(|| Error::AgentNotFound(envelope.from_agent.clone()))?;
            let recipient = agents
                .get(&envelope.to_agent)
                .ok_or_else(|| Error::AgentNotFound(envelope.to_agent.clone()))?;
            if !sender.connections.contains(&envelope.to_agent) {
                return Err(Error::NotConnected {
                    from: envelope.from_agent.clone(),
                    to: envelope.to_agent.clone(),
                });
            }
            recipient.handle.clone()
        };

        let id = envelope.id.clone();
        tracing::debug!(
            message_id = %id,
            from = %envelope.from_agent,
            to = %envelope.to_agent,
            kind = %envelope.kind,
            "Delivering message"
        );
        recipient.deliver(envelope).await;
        Ok(id)
    }

    /// Convenience wrapper around [`Registry::route`] for a direct message.
    pub async fn send_message(&self, from: &str, to: &str, content: Value) -> Result<String> {
        self.route(Envelope::new(from, to, content)).await
    }

    pub async fn info(&self, id: &str) -> Result<AgentInfo> {
        let (handle, connections) = {
            let agents = self.agents.read().await;
            let entry = agents
                .get(id)
                .ok_or_else(|| Error::AgentNotFound(id.to_string()))?;
            (entry.handle.clone(), entry.connections.clone())
        };
        Ok(handle.info(connections).await)
    }

    /// Snapshots of every agent, ordered by creation time.
    pub async fn list(&self) -> Vec<AgentInfo> {
        let snapshot: Vec<(Arc<AgentHandle>, BTreeSet<AgentId>)> = {
            let agents = self.agents.read().await;
            agents
                .values()
                .map(|entry| (entry.handle.clone(), entry.connections.clone()))
                .collect()
        };

        let mut infos = Vec::with_capacity(snapshot.len());
        for (handle, connections) in snapshot {
            infos.push(handle.info(connections).await);
        }
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        infos
    }
}
