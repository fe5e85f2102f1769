//! The orchestrator: agent lifecycle, connections, routing, tasks, and shared memory.

use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::worker::Worker;
use crate::agent::{AgentHandle, AgentId, AgentInfo, AgentStatus, HandlerTable, TaskContext};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::memory::{MemoryEntry, MemoryStats, SharedMemoryStore};
use crate::protocol::{Envelope, MailboxStats};
use crate::task::{Task, TaskId};
use crate::tools::{self, ToolInvoker};

use super::Registry;

/// Central authority over agents and shared memory.
///
/// Cloning is cheap; clones share the same registry and store.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<Registry>,
    memory: Arc<SharedMemoryStore>,
    tools: Arc<dyn ToolInvoker>,
    handlers: Arc<HandlerTable>,
}

impl Orchestrator {
    /// Orchestrator with the built-in task handlers.
    pub fn new(tools: Arc<dyn ToolInvoker>) -> Self {
        Self::with_handlers(tools, HandlerTable::builtin())
    }

    pub fn with_handlers(tools: Arc<dyn ToolInvoker>, handlers: HandlerTable) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            memory: Arc::new(SharedMemoryStore::new()),
            tools,
            handlers: Arc::new(handlers),
        }
    }

    /// Orchestrator whose tool invoker is built from `settings.tools`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(tools::create_invoker(&settings.tools))
    }

    pub fn memory(&self) -> Arc<SharedMemoryStore> {
        self.memory.clone()
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    // ---- agent lifecycle ----

    /// Create an agent and start its worker.
    pub async fn create_agent<I, S>(&self, name: &str, capabilities: I) -> AgentId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let capabilities: BTreeSet<String> = capabilities.into_iter().map(Into::into).collect();

        let (handle, channels) = AgentHandle::new(id.clone(), name.to_string(), capabilities);
        let ctx = TaskContext::new(
            id.clone(),
            self.memory.clone(),
            self.tools.clone(),
            Arc::downgrade(&self.registry),
        );
        let worker = Worker::new(channels, self.handlers.clone(), ctx);

        let handle = Arc::new(handle);
        handle.attach_worker(tokio::spawn(worker.run()));
        self.registry.insert(handle.clone()).await;

        tracing::info!(
            agent_id = %id,
            name,
            capabilities = ?handle.capabilities,
            "Created agent"
        );
        id
    }

    /// Delete an agent. Its connections are severed and its queued tasks abandoned.
    pub async fn delete_agent(&self, id: &str) -> Result<()> {
        let handle = self.registry.remove(id).await?;
        handle.shutdown();
        tracing::info!(agent_id = %id, "Deleted agent");
        Ok(())
    }

    /// Pause an agent between tasks. Submissions still queue.
    pub async fn stop_agent(&self, id: &str) -> Result<()> {
        let handle = self.registry.handle(id).await?;
        if handle.set_status(AgentStatus::Stopped) != AgentStatus::Stopped {
            tracing::info!(agent_id = %id, "Stopped agent");
        }
        Ok(())
    }

    /// Resume a stopped agent.
    pub async fn start_agent(&self, id: &str) -> Result<()> {
        let handle = self.registry.handle(id).await?;
        if handle.set_status(AgentStatus::Active) != AgentStatus::Active {
            tracing::info!(agent_id = %id, "Started agent");
        }
        Ok(())
    }

    pub async fn get_agent(&self, id: &str) -> Result<AgentInfo> {
        self.registry.info(id).await
    }

    pub async fn list_agents(&self) -> Vec<AgentInfo> {
        self.registry.list().await
    }

    /// Delete every agent and stop every worker.
    pub async fn shutdown(&self) {
        let handles = self.registry.drain().await;
        let count = handles.len();
        for handle in handles {
            handle.shutdown();
        }
        tracing::info!(agents = count, "Orchestrator shut down");
    }

    // ---- connections ----

    /// Connect two agents in both directions. Idempotent.
    pub async fn connect(&self, a: &str, b: &str) -> Result<()> {
        self.registry.connect(a, b, true).await?;
        tracing::debug!(a, b, "Connected agents");
        Ok(())
    }

    /// Allow `from` to message `to` without the reverse edge.
    pub async fn connect_directed(&self, from: &str, to: &str) -> Result<()> {
        self.registry.connect(from, to, false).await
    }

    /// Remove both directions between two agents.
    pub async fn disconnect(&self, a: &str, b: &str) -> Result<()> {
        self.registry.disconnect(a, b, true).await?;
        tracing::debug!(a, b, "Disconnected agents");
        Ok(())
    }

    pub async fn disconnect_directed(&self, from: &str, to: &str) -> Result<()> {
        self.registry.disconnect(from, to, false).await
    }

    // ---- messaging ----

    /// Send a message along an existing connection. Returns the message id.
    pub async fn send_message(&self, sender: &str, recipient: &str, content: Value) -> Result<String> {
        self.registry.send_message(sender, recipient, content).await
    }

    /// Deliver a prepared envelope (for example a reply).
    pub async fn route(&self, envelope: Envelope) -> Result<String> {
        self.registry.route(envelope).await
    }

    /// Take up to `max` messages from an agent's inbox, oldest first.
    pub async fn receive_messages(&self, id: &str, max: usize) -> Result<Vec<Envelope>> {
        let handle = self.registry.handle(id).await?;
        Ok(handle.drain_inbox(max).await)
    }

    /// Inbox counters for an agent.
    pub async fn mailbox_stats(&self, id: &str) -> Result<MailboxStats> {
        let handle = self.registry.handle(id).await?;
        Ok(handle.mailbox_stats().await)
    }

    // ---- tasks ----

    /// Queue a task. Any task type is accepted here; unrecognized types fail
    /// when the agent dispatches them.
    pub async fn submit_task(&self, id: &str, task_type: &str, payload: Value) -> Result<TaskId> {
        let handle = self.registry.handle(id).await?;
        let task = Task::new(id, task_type, payload);
        let task_id = task.id.clone();
        handle
            .enqueue(task)
            .map_err(|_| Error::AgentNotFound(id.to_string()))?;
        tracing::debug!(agent_id = %id, task_id = %task_id, task_type, "Submitted task");
        Ok(task_id)
    }

    /// Take up to `max_count` finished tasks without waiting.
    pub async fn poll_responses(&self, id: &str, max_count: usize) -> Result<Vec<Task>> {
        let handle = self.registry.handle(id).await?;
        Ok(handle.poll_responses(max_count).await)
    }

    /// Wait until `count` tasks finish or `timeout` elapses, whichever is
    /// first. On timeout, returns whatever finished (possibly nothing).
    pub async fn wait_for_responses(
        &self,
        id: &str,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<Task>> {
        let handle = self.registry.handle(id).await?;
        Ok(handle.wait_for_responses(count, timeout).await)
    }

    // ---- memory ----

    pub async fn memory_store<I, S>(&self, key: &str, value: Value, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memory.store(key, value, tags).await;
    }

    pub async fn memory_retrieve(&self, key: &str) -> Result<Value> {
        self.memory
            .retrieve(key)
            .await
            .ok_or_else(|| Error::MemoryKeyNotFound(key.to_string()))
    }

    pub async fn memory_search<I, S>(&self, tags: I) -> Vec<MemoryEntry>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memory.search(tags).await
    }

    pub async fn memory_delete(&self, key: &str) -> bool {
        self.memory.delete(key).await
    }

    pub async fn memory_keys(&self) -> Vec<String> {
        self.memory.list_keys().await
    }

    pub async fn memory_stats(&self) -> MemoryStats {
        self.memory.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TaskHandler;
    use crate::task::{TaskError, TaskKind, TaskStatus};
    use crate::tools::{FailureCode, FnInvoker, ToolError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;

    const WAIT: Duration = Duration::from_secs(5);

    fn echo_tools() -> Arc<dyn ToolInvoker> {
        Arc::new(FnInvoker::new(|capability, params| {
            Ok(json!({ "capability": capability, "params": params }))
        }))
    }

    fn orchestrator() -> Orchestrator {
        crate::logging::init_test();
        Orchestrator::new(echo_tools())
    }

    #[tokio::test]
    async fn test_create_agent_ids_are_unique_and_visible() {
        let orch = orchestrator();
        let mut seen = HashSet::new();
        for i in 0..20 {
            let id = orch.create_agent(&format!("agent-{}", i), Vec::<String>::new()).await;
            assert!(seen.insert(id.clone()));
            orch.submit_task(&id, "memory", json!({"operation": "retrieve", "key": "x"}))
                .await
                .unwrap();
        }
        let ids: Vec<AgentId> = seen.iter().cloned().collect();
        orch.connect(&ids[0], &ids[1]).await.unwrap();
        assert_eq!(orch.list_agents().await.len(), 20);
    }

    #[tokio::test]
    async fn test_search_agent_scenario() {
        let tools: Arc<dyn ToolInvoker> = Arc::new(FnInvoker::new(|capability, params| {
            assert_eq!(capability, "web_search");
            Ok(json!({
                "results": [{"title": "ML", "url": "https://example.com/ml"}],
                "query": params["query"],
            }))
        }));
        let orch = Orchestrator::new(tools);
        let agent = orch.create_agent("SearchAgent", ["search"]).await;

        orch.submit_task(&agent, "query", json!({"query": "machine learning"}))
            .await
            .unwrap();
        let responses = orch.wait_for_responses(&agent, 1, WAIT).await.unwrap();

        assert_eq!(responses.len(), 1);
        let task = &responses[0];
        assert_eq!(task.status, TaskStatus::Completed);
        let result = task.result.as_ref().unwrap();
        assert_eq!(result["output"]["results"][0]["url"], "https://example.com/ml");
        assert_eq!(result["output"]["query"], "machine learning");
        assert!(task.completed_at.is_some());

        // Delivered once.
        assert!(orch.poll_responses(&agent, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_task_type_fails_as_data_and_loop_continues() {
        let orch = orchestrator();
        let agent = orch.create_agent("worker", Vec::<String>::new()).await;

        let bad = orch.submit_task(&agent, "summon_dragon", json!({})).await.unwrap();
        let good = orch
            .submit_task(&agent, "process_search_results", json!({"text": "https://a.example"}))
            .await
            .unwrap();

        let responses = orch.wait_for_responses(&agent, 2, WAIT).await.unwrap();
        assert_eq!(responses.len(), 2);

        assert_eq!(responses[0].id, bad);
        assert_eq!(responses[0].status, TaskStatus::Error);
        assert!(responses[0].error_message().unwrap().contains("summon_dragon"));

        assert_eq!(responses[1].id, good);
        assert_eq!(responses[1].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_tool_failure_becomes_error_result() {
        let tools: Arc<dyn ToolInvoker> = Arc::new(FnInvoker::new(|cap, _| {
            Err(ToolError::new(cap, FailureCode::Timeout, "search timed out"))
        }));
        let orch = Orchestrator::new(tools);
        let agent = orch.create_agent("SearchAgent", ["search"]).await;

        orch.submit_task(&agent, "query", json!({"query": "x"})).await.unwrap();
        let responses = orch.wait_for_responses(&agent, 1, WAIT).await.unwrap();

        let task = &responses[0];
        assert_eq!(task.status, TaskStatus::Error);
        let result = task.result.as_ref().unwrap();
        assert_eq!(result["kind"], "tool");
        assert_eq!(result["tool"]["code"], "timeout");
        assert!(task.error_message().unwrap().contains("search timed out"));
    }

    #[tokio::test]
    async fn test_analyze_repo_validation_error() {
        let orch = orchestrator();
        let agent = orch.create_agent("RepoAgent", ["github"]).await;

        orch.submit_task(&agent, "analyze_repo", json!({"branch": "main"}))
            .await
            .unwrap();
        let responses = orch.wait_for_responses(&agent, 1, WAIT).await.unwrap();
        assert_eq!(responses[0].status, TaskStatus::Error);
        assert_eq!(responses[0].result.as_ref().unwrap()["kind"], "validation");
    }

    struct Panicking;

    #[async_trait]
    impl TaskHandler for Panicking {
        async fn handle(&self, _ctx: &TaskContext, _payload: Value) -> std::result::Result<Value, TaskError> {
            panic!("handler exploded");
        }
    }

    #[tokio::test]
    async fn test_handler_panic_is_captured() {
        let mut handlers = HandlerTable::builtin();
        handlers.register(TaskKind::CallFunction, Arc::new(Panicking));
        let orch = Orchestrator::with_handlers(echo_tools(), handlers);
        let agent = orch.create_agent("fragile", Vec::<String>::new()).await;

        orch.submit_task(&agent, "call_function", json!({})).await.unwrap();
        orch.submit_task(&agent, "memory", json!({"operation": "store", "key": "k", "value": 1}))
            .await
            .unwrap();

        let responses = orch.wait_for_responses(&agent, 2, WAIT).await.unwrap();
        assert_eq!(responses[0].status, TaskStatus::Error);
        assert_eq!(responses[0].result.as_ref().unwrap()["kind"], "panicked");
        assert!(responses[0].error_message().unwrap().contains("handler exploded"));
        assert_eq!(responses[1].status, TaskStatus::Completed);
        assert_eq!(orch.memory_retrieve("k").await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_tasks_run_in_submission_order() {
        let orch = orchestrator();
        let agent = orch.create_agent("ordered", Vec::<String>::new()).await;

        let mut submitted = Vec::new();
        for i in 0..25 {
            let id = orch
                .submit_task(&agent, "memory", json!({"operation": "store", "key": format!("k{}", i), "value": i}))
                .await
                .unwrap();
            submitted.push(id);
        }

        let responses = orch.wait_for_responses(&agent, 25, WAIT).await.unwrap();
        let finished: Vec<TaskId> = responses.into_iter().map(|t| t.id).collect();
        assert_eq!(finished, submitted);
    }

    #[tokio::test]
    async fn test_wait_for_responses_times_out_empty() {
        let orch = orchestrator();
        let agent = orch.create_agent("idle", Vec::<String>::new()).await;

        let started = tokio::time::Instant::now();
        let responses = orch
            .wait_for_responses(&agent, 1, Duration::from_millis(150))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert!(responses.is_empty());
        assert!(elapsed >= Duration::from_millis(150));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_delete_agent_severs_and_rejects() {
        let orch = orchestrator();
        let a = orch.create_agent("A", ["search"]).await;
        let b = orch.create_agent("B", ["memory"]).await;
        let c = orch.create_agent("C", Vec::<String>::new()).await;
        orch.connect(&a, &b).await.unwrap();
        orch.connect(&b, &c).await.unwrap();

        orch.delete_agent(&b).await.unwrap();

        assert!(orch.get_agent(&a).await.unwrap().connections.is_empty());
        assert!(orch.get_agent(&c).await.unwrap().connections.is_empty());
        assert!(matches!(orch.connect(&a, &b).await, Err(Error::AgentNotFound(_))));
        assert!(matches!(
            orch.submit_task(&b, "query", json!({"query": "x"})).await,
            Err(Error::AgentNotFound(_))
        ));
        assert!(matches!(orch.poll_responses(&b, 1).await, Err(Error::AgentNotFound(_))));
        assert!(matches!(orch.delete_agent(&b).await, Err(Error::AgentNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_agent_abandons_queued_tasks() {
        let orch = orchestrator();
        let agent = orch.create_agent("doomed", ["memory"]).await;
        orch.stop_agent(&agent).await.unwrap();
        orch.submit_task(
            &agent,
            "memory",
            json!({"operation": "store", "key": "never", "value": true}),
        )
        .await
        .unwrap();

        orch.delete_agent(&agent).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(matches!(
            orch.memory_retrieve("never").await,
            Err(Error::MemoryKeyNotFound(_))
        ));
        assert!(orch.memory_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_agent() {
        let orch = orchestrator();
        let a = orch.create_agent("A", Vec::<String>::new()).await;

        assert!(matches!(
            orch.disconnect(&a, "ghost").await,
            Err(Error::AgentNotFound(id)) if id == "ghost"
        ));
        assert!(matches!(
            orch.disconnect("ghost", &a).await,
            Err(Error::AgentNotFound(id)) if id == "ghost"
        ));
        assert!(matches!(
            orch.disconnect_directed(&a, "ghost").await,
            Err(Error::AgentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_poll_is_not_blocked_by_pending_wait() {
        let orch = orchestrator();
        let agent = orch.create_agent("shared", Vec::<String>::new()).await;

        let waiter = {
            let orch = orch.clone();
            let agent = agent.clone();
            tokio::spawn(async move {
                orch.wait_for_responses(&agent, 5, Duration::from_secs(1)).await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let started = tokio::time::Instant::now();
        let polled = orch.poll_responses(&agent, 10).await.unwrap();
        assert!(polled.is_empty());
        assert!(started.elapsed() < Duration::from_millis(500));

        orch.submit_task(&agent, "process_search_results", json!([]))
            .await
            .unwrap();
        let early = waiter.await.unwrap().unwrap();
        let late = orch.poll_responses(&agent, 10).await.unwrap();
        assert_eq!(early.len() + late.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_rules() {
        let orch = orchestrator();
        let a = orch.create_agent("A", Vec::<String>::new()).await;
        let b = orch.create_agent("B", Vec::<String>::new()).await;

        assert!(matches!(
            orch.send_message(&a, &b, json!("early")).await,
            Err(Error::NotConnected { .. })
        ));
        assert!(matches!(
            orch.send_message(&a, "ghost", json!("x")).await,
            Err(Error::AgentNotFound(id)) if id == "ghost"
        ));

        orch.connect(&a, &b).await.unwrap();
        orch.send_message(&a, &b, json!("hello")).await.unwrap();
        orch.send_message(&a, &b, json!("world")).await.unwrap();

        let inbox = orch.receive_messages(&b, 10).await.unwrap();
        let contents: Vec<Value> = inbox.iter().map(|e| e.content.clone()).collect();
        assert_eq!(contents, vec![json!("hello"), json!("world")]);
        assert_eq!(inbox[0].from_agent, a);
        assert!(orch.receive_messages(&b, 10).await.unwrap().is_empty());
        assert_eq!(orch.mailbox_stats(&b).await.unwrap().total_received, 2);

        orch.disconnect(&a, &b).await.unwrap();
        orch.disconnect(&a, &b).await.unwrap();
        assert!(matches!(
            orch.send_message(&a, &b, json!("late")).await,
            Err(Error::NotConnected { .. })
        ));
    }

    struct Relay;

    #[async_trait]
    impl TaskHandler for Relay {
        async fn handle(&self, ctx: &TaskContext, payload: Value) -> std::result::Result<Value, TaskError> {
            let to = payload["to"].as_str().unwrap_or_default().to_string();
            let id = ctx
                .send_message(&to, payload["content"].clone())
                .await
                .map_err(|e| TaskError::Handler(e.to_string()))?;
            Ok(json!({ "message_id": id }))
        }
    }

    #[tokio::test]
    async fn test_handlers_can_message_peers() {
        let mut handlers = HandlerTable::builtin();
        handlers.register(TaskKind::CallFunction, Arc::new(Relay));
        let orch = Orchestrator::with_handlers(echo_tools(), handlers);
        let a = orch.create_agent("A", Vec::<String>::new()).await;
        let b = orch.create_agent("B", Vec::<String>::new()).await;
        let c = orch.create_agent("C", Vec::<String>::new()).await;
        orch.connect(&a, &b).await.unwrap();

        orch.submit_task(&a, "call_function", json!({"to": b, "content": "ping"}))
            .await
            .unwrap();
        orch.submit_task(&a, "call_function", json!({"to": c, "content": "nope"}))
            .await
            .unwrap();
        let responses = orch.wait_for_responses(&a, 2, WAIT).await.unwrap();

        assert_eq!(responses[0].status, TaskStatus::Completed);
        assert_eq!(responses[1].status, TaskStatus::Error);
        assert!(responses[1].error_message().unwrap().contains("not connected"));

        let inbox = orch.receive_messages(&b, 10).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].content, json!("ping"));

        let reply = inbox[0].reply(json!("pong"));
        orch.route(reply).await.unwrap();
        let back = orch.receive_messages(&a, 10).await.unwrap();
        assert_eq!(back[0].reply_to.as_deref(), Some(inbox[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_stopped_agent_holds_tasks_until_started() {
        let orch = orchestrator();
        let agent = orch.create_agent("pausable", Vec::<String>::new()).await;
        orch.stop_agent(&agent).await.unwrap();
        assert_eq!(orch.get_agent(&agent).await.unwrap().status, AgentStatus::Stopped);

        orch.submit_task(&agent, "process_search_results", json!([]))
            .await
            .unwrap();
        let none = orch
            .wait_for_responses(&agent, 1, Duration::from_millis(100))
            .await
            .unwrap();
        assert!(none.is_empty());

        orch.start_agent(&agent).await.unwrap();
        let done = orch.wait_for_responses(&agent, 1, WAIT).await.unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_memory_operations() {
        let orch = orchestrator();
        orch.memory_store("paper:1", json!({"title": "Attention"}), ["ml", "paper"]).await;
        orch.memory_store("note:1", json!("todo"), ["ml"]).await;

        assert_eq!(
            orch.memory_retrieve("paper:1").await.unwrap(),
            json!({"title": "Attention"})
        );
        assert!(matches!(
            orch.memory_retrieve("missing").await,
            Err(Error::MemoryKeyNotFound(k)) if k == "missing"
        ));

        let hits = orch.memory_search(["ml", "paper"]).await;
        assert_eq!(hits.len(), 1);
        assert!(orch.memory_search(Vec::<String>::new()).await.is_empty());

        assert!(orch.memory_delete("note:1").await);
        assert!(!orch.memory_delete("note:1").await);
        assert_eq!(orch.memory_keys().await, vec!["paper:1".to_string()]);
        assert_eq!(orch.memory_stats().await.entries, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_agents_share_memory_concurrently() {
        let orch = orchestrator();
        let mut agents = Vec::new();
        for i in 0..4 {
            agents.push(orch.create_agent(&format!("writer-{}", i), ["memory"]).await);
        }

        for (n, agent) in agents.iter().enumerate() {
            for i in 0..25 {
                orch.submit_task(
                    agent,
                    "memory",
                    json!({"operation": "store", "key": format!("a{}-{}", n, i), "value": i, "tags": ["shared"]}),
                )
                .await
                .unwrap();
            }
        }
        for agent in &agents {
            let done = orch.wait_for_responses(agent, 25, WAIT).await.unwrap();
            assert_eq!(done.len(), 25);
        }

        assert_eq!(orch.memory_search(["shared"]).await.len(), 100);
    }

    #[tokio::test]
    async fn test_shutdown_clears_registry() {
        let orch = orchestrator();
        let a = orch.create_agent("A", Vec::<String>::new()).await;
        orch.create_agent("B", Vec::<String>::new()).await;

        orch.shutdown().await;
        assert!(orch.list_agents().await.is_empty());
        assert!(matches!(orch.get_agent(&a).await, Err(Error::AgentNotFound(_))));
    }
}
