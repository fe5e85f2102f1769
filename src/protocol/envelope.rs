//! Message envelopes with correlation IDs for tracking agent communication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::MessageKind;

/// Message routed between two agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique message ID (ULID)
    pub id: String,
    /// Correlation ID for request/response chains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Envelope this one answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Sender agent ID
    pub from_agent: String,
    /// Recipient agent ID
    pub to_agent: String,
    pub kind: MessageKind,
    /// Opaque message content
    pub content: Value,
    pub created_at: DateTime<Utc>,
}

impl Envelope {
    /// Create a direct envelope from one agent to another.
    pub fn new(from_agent: impl Into<String>, to_agent: impl Into<String>, content: Value) -> Self {
        Self {
            id: generate_id(),
            correlation_id: None,
            reply_to: None,
            from_agent: from_agent.into(),
            to_agent: to_agent.into(),
            kind: MessageKind::Direct,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set correlation ID for request/response tracking.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Build the reply to this envelope, addressed back to its sender.
    pub fn reply(&self, content: Value) -> Self {
        Self {
            id: generate_id(),
            correlation_id: self.correlation_id.clone().or_else(|| Some(self.id.clone())),
            reply_to: Some(self.id.clone()),
            from_agent: self.to_agent.clone(),
            to_agent: self.from_agent.clone(),
            kind: MessageKind::Response,
            content,
            created_at: Utc::now(),
        }
    }
}

fn generate_id() -> String {
    ulid::Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_creation() {
        let envelope = Envelope::new("a", "b", json!("hello"));

        assert_eq!(envelope.from_agent, "a");
        assert_eq!(envelope.to_agent, "b");
        assert_eq!(envelope.kind, MessageKind::Direct);
        assert!(!envelope.id.is_empty());
        assert!(envelope.correlation_id.is_none());
    }

    #[test]
    fn test_reply_swaps_direction() {
        let request = Envelope::new("a", "b", json!({"ask": 1})).with_kind(MessageKind::Request);
        let reply = request.reply(json!({"answer": 2}));

        assert_eq!(reply.from_agent, "b");
        assert_eq!(reply.to_agent, "a");
        assert_eq!(reply.kind, MessageKind::Response);
        assert_eq!(reply.reply_to.as_deref(), Some(request.id.as_str()));
        assert_eq!(reply.correlation_id.as_deref(), Some(request.id.as_str()));
    }

    #[test]
    fn test_reply_keeps_existing_correlation() {
        let request = Envelope::new("a", "b", json!(null)).with_correlation_id("chain-1");
        assert_eq!(request.reply(json!(null)).correlation_id.as_deref(), Some("chain-1"));
    }
}
