//! Agents: per-agent state, queues, and the worker that drains them.
//!
//! An [`AgentHandle`] is the orchestrator's view of one agent. It holds the
//! producer side of the task queue, the shared response queue,
//! the inbox, and the lifecycle status. The [`worker`] owns the other ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::protocol::{Envelope, Mailbox, MailboxStats};
use crate::task::Task;

pub mod context;
pub mod handlers;
pub mod worker;

pub use context::TaskContext;
pub use handlers::{HandlerTable, TaskHandler};

/// Agent identifier (UUID v4).
pub type AgentId = String;

/// Agent lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Stopped,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Active => write!(f, "active"),
            AgentStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Point-in-time snapshot of an agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub id: AgentId,
    pub name: String,
    pub capabilities: BTreeSet<String>,
    pub status: AgentStatus,
    pub connections: BTreeSet<AgentId>,
    pub pending_messages: usize,
    pub created_at: DateTime<Utc>,
}

/// Finished tasks awaiting collection.
///
/// The lock is only held to push or take; waiters park on `ready` instead.
#[derive(Default)]
pub(crate) struct ResponseQueue {
    tasks: Mutex<VecDeque<Task>>,
    ready: Notify,
}

impl ResponseQueue {
    pub(crate) async fn push(&self, task: Task) {
        self.tasks.lock().await.push_back(task);
        self.ready.notify_waiters();
    }

    async fn take(&self, max: usize) -> Vec<Task> {
        let mut tasks = self.tasks.lock().await;
        let n = max.min(tasks.len());
        tasks.drain(..n).collect()
    }
}

/// The queue ends the worker consumes and produces.
pub(crate) struct WorkerChannels {
    pub tasks: mpsc::UnboundedReceiver<Task>,
    pub responses: Arc<ResponseQueue>,
    pub status: watch::Receiver<AgentStatus>,
}

/// Orchestrator-side handle to a running agent.
pub struct AgentHandle {
    pub id: AgentId,
    pub name: String,
    pub capabilities: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    tasks: mpsc::UnboundedSender<Task>,
    responses: Arc<ResponseQueue>,
    inbox: Mutex<Mailbox>,
    status: watch::Sender<AgentStatus>,
    worker: std::sync::OnceLock<JoinHandle<()>>,
}

impl AgentHandle {
    /// Build a handle and the channel ends its worker will own.
    pub(crate) fn new(
        id: AgentId,
        name: String,
        capabilities: BTreeSet<String>,
    ) -> (Self, WorkerChannels) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let responses = Arc::new(ResponseQueue::default());
        let (status_tx, status_rx) = watch::channel(AgentStatus::Active);

        let handle = Self {
            id,
            name,
            capabilities,
            created_at: Utc::now(),
            tasks: task_tx,
            responses: responses.clone(),
            inbox: Mutex::new(Mailbox::new()),
            status: status_tx,
            worker: std::sync::OnceLock::new(),
        };
        let channels = WorkerChannels {
            tasks: task_rx,
            responses,
            status: status_rx,
        };
        (handle, channels)
    }

    pub(crate) fn attach_worker(&self, worker: JoinHandle<()>) {
        if let Err(worker) = self.worker.set(worker) {
            // A handle only ever gets one worker; a second one is surplus.
            worker.abort();
        }
    }

    pub fn status(&self) -> AgentStatus {
        *self.status.borrow()
    }

    pub(crate) fn set_status(&self, status: AgentStatus) -> AgentStatus {
        self.status.send_replace(status)
    }

    /// Queue a task for the worker. Returns the task back if the worker is gone.
    pub(crate) fn enqueue(&self, task: Task) -> Result<(), Task> {
        self.tasks.send(task).map_err(|e| e.0)
    }

    pub(crate) async fn deliver(&self, envelope: Envelope) {
        self.inbox.lock().await.deliver(envelope);
    }

    pub(crate) async fn drain_inbox(&self, max: usize) -> Vec<Envelope> {
        self.inbox.lock().await.drain(max)
    }

    pub(crate) async fn pending_messages(&self) -> usize {
        self.inbox.lock().await.len()
    }

    pub(crate) async fn mailbox_stats(&self) -> MailboxStats {
        self.inbox.lock().await.stats()
    }

    /// Take up to `max` finished tasks without waiting.
    pub(crate) async fn poll_responses(&self, max: usize) -> Vec<Task> {
        self.responses.take(max).await
    }

    /// Collect finished tasks until `count` arrive or `timeout` elapses.
    pub(crate) async fn wait_for_responses(&self, count: usize, timeout: Duration) -> Vec<Task> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();

        while out.len() < count {
            // Register before checking so a push between the two is not missed.
            let notified = self.responses.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            out.extend(self.responses.take(count - out.len()).await);
            if out.len() >= count {
                break;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                break;
            }
        }
        out
    }

    /// Stop the worker. Queued and in-flight tasks are abandoned.
    pub(crate) fn shutdown(&self) {
        self.set_status(AgentStatus::Stopped);
        if let Some(worker) = self.worker.get() {
            worker.abort();
        }
    }

    pub(crate) async fn info(&self, connections: BTreeSet<AgentId>) -> AgentInfo {
        AgentInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            capabilities: self.capabilities.clone(),
            status: self.status(),
            connections,
            pending_messages: self.pending_messages().await,
            created_at: self.created_at,
        }
    }
}
