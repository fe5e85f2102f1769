//! Agent communication protocol.
//!
//! - Message envelopes with correlation IDs
//! - Typed message kinds (direct, request, response, notification)
//! - Per-agent inboxes

pub mod envelope;
pub mod mailbox;
pub mod types;

pub use envelope::Envelope;
pub use mailbox::{Mailbox, MailboxStats};
pub use types::MessageKind;
