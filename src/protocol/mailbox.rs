//! Agent inbox for inter-agent communication.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

use super::envelope::Envelope;

/// An agent's inbound message queue, in arrival order.
#[derive(Debug)]
pub struct Mailbox {
    inbox: VecDeque<Envelope>,
    total_received: u64,
    last_activity: DateTime<Utc>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        Self {
            inbox: VecDeque::new(),
            total_received: 0,
            last_activity: Utc::now(),
        }
    }

    /// Append an envelope to the back of the inbox.
    pub fn deliver(&mut self, envelope: Envelope) {
        self.inbox.push_back(envelope);
        self.total_received += 1;
        self.last_activity = Utc::now();
    }

    /// Remove and return up to `max` envelopes from the front.
    pub fn drain(&mut self, max: usize) -> Vec<Envelope> {
        let n = max.min(self.inbox.len());
        if n > 0 {
            self.last_activity = Utc::now();
        }
        self.inbox.drain(..n).collect()
    }

    pub fn len(&self) -> usize {
        self.inbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbox.is_empty()
    }

    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            pending: self.inbox.len(),
            total_received: self.total_received,
            last_activity: self.last_activity,
        }
    }
}

/// Mailbox statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MailboxStats {
    pub pending: usize,
    pub total_received: u64,
    pub last_activity: DateTime<Utc>,
}
