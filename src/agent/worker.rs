//! The agent worker loop: drain the task queue, dispatch, publish results.

use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use crate::task::{Task, TaskError};

use super::{AgentId, AgentStatus, HandlerTable, TaskContext, WorkerChannels};

pub(crate) struct Worker {
    agent_id: AgentId,
    channels: WorkerChannels,
    handlers: Arc<HandlerTable>,
    ctx: TaskContext,
}

enum Next {
    Task(Option<Task>),
    StatusChanged(bool),
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Worker {
    pub(crate) fn new(
        channels: WorkerChannels,
        handlers: Arc<HandlerTable>,
        ctx: TaskContext,
    ) -> Self {
        Self {
            agent_id: ctx.agent_id.clone(),
            channels,
            handlers,
            ctx,
        }
    }

    /// Run until the task queue closes or the status channel is dropped.
    pub(crate) async fn run(mut self) {
        tracing::info!(agent_id = %self.agent_id, "Agent worker started");

        loop {
            // Paused agents keep their queue but take nothing from it.
            while *self.channels.status.borrow_and_update() == AgentStatus::Stopped {
                if self.channels.status.changed().await.is_err() {
                    tracing::info!(agent_id = %self.agent_id, "Agent worker exiting");
                    return;
                }
            }

            let next = tokio::select! {
                task = self.channels.tasks.recv() => Next::Task(task),
                changed = self.channels.status.changed() => Next::StatusChanged(changed.is_ok()),
            };

            match next {
                Next::Task(Some(task)) => self.process(task).await,
                Next::Task(None) | Next::StatusChanged(false) => break,
                Next::StatusChanged(true) => continue,
            }
        }

        tracing::info!(agent_id = %self.agent_id, "Agent worker exiting");
    }

    async fn process(&self, mut task: Task) {
        if let Err(e) = task.mark_running() {
            tracing::warn!(agent_id = %self.agent_id, task_id = %task.id, "Skipping task: {}", e);
            return;
        }
        tracing::debug!(
            agent_id = %self.agent_id,
            task_id = %task.id,
            task_type = %task.task_type,
            "Running task"
        );

        let outcome = self.dispatch(&task).await;
        let recorded = match outcome {
            Ok(result) => task.complete(result),
            Err(e) => {
                tracing::warn!(
                    agent_id = %self.agent_id,
                    task_id = %task.id,
                    kind = e.kind(),
                    "Task failed: {}",
                    e
                );
                task.fail(&e)
            }
        };
        if let Err(e) = recorded {
            tracing::warn!(agent_id = %self.agent_id, task_id = %task.id, "{}", e);
        }

        tracing::debug!(agent_id = %self.agent_id, task_id = %task.id, status = %task.status, "Task finished");
        self.channels.responses.push(task).await;
    }

    async fn dispatch(&self, task: &Task) -> Result<Value, TaskError> {
        let handler = task
            .kind()
            .ok()
            .and_then(|kind| self.handlers.get(kind))
            .ok_or_else(|| TaskError::UnknownType(task.task_type.clone()))?;

        let ctx = self.ctx.clone();
        let payload = task.payload.clone();
        // A separate tokio task turns a handler panic into a JoinError.
        let joined = tokio::spawn(async move { handler.handle(&ctx, payload).await }).await;

        match joined {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(TaskError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(TaskError::Handler(e.to_string())),
        }
    }
}
