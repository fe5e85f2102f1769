//! Message types for agent communication protocol.

use serde::{Deserialize, Serialize};

/// Message kind classification.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain agent-to-agent message
    #[default]
    Direct,
    /// Request expecting a reply
    Request,
    /// Reply to an earlier envelope
    Response,
    /// Status update, no reply expected
    Notification,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Direct => write!(f, "direct"),
            MessageKind::Request => write!(f, "request"),
            MessageKind::Response => write!(f, "response"),
            MessageKind::Notification => write!(f, "notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(serde_json::to_string(&MessageKind::Response).unwrap(), "\"response\"");
        let kind: MessageKind = serde_json::from_str("\"notification\"").unwrap();
        assert_eq!(kind, MessageKind::Notification);
        assert_eq!(MessageKind::default(), MessageKind::Direct);
    }
}
