//! CLI commands for agentweave using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use crate::config::{load_settings_or_default, Settings};
use crate::core::Orchestrator;
use crate::task::Task;

/// agentweave - multi-agent orchestration with shared memory.
#[derive(Parser)]
#[command(name = "agentweave")]
#[command(version = "0.1.0")]
#[command(about = "agentweave - agents, connections, tasks, and shared memory", long_about = None)]
pub struct Commands {
    /// Serve tool calls from canned local results instead of the tool gateway
    #[arg(long, global = true, env = "AGENTWEAVE_OFFLINE")]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a web search query through a search agent
    #[command(alias = "q")]
    Query {
        /// Query text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Submit one task to a fresh agent and print the finished task
    Task {
        /// Task type: query, analyze_repo, scrape_url, process_search_results, memory, call_function
        task_type: String,

        /// Task payload as JSON
        #[arg(default_value = "{}")]
        payload: String,

        /// Capabilities to give the agent
        #[arg(long = "capability", short = 'c')]
        capabilities: Vec<String>,
    },

    /// Walk through two connected agents sharing results
    Demo,

    /// Show effective settings
    Config,
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        let settings = self.settings();
        match &self.command {
            Command::Query { text } => cmd_query(&settings, &text.join(" ")).await,
            Command::Task {
                task_type,
                payload,
                capabilities,
            } => cmd_task(&settings, task_type, payload, capabilities).await,
            Command::Demo => cmd_demo(&settings).await,
            Command::Config => cmd_config(&settings),
        }
    }

    fn settings(&self) -> Settings {
        let mut settings = load_settings_or_default();
        if self.offline {
            settings.tools.offline = true;
        }
        settings
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Submit a task to `agent` and wait for it to finish.
async fn run_task(
    orch: &Orchestrator,
    settings: &Settings,
    agent: &str,
    task_type: &str,
    payload: Value,
) -> Result<Task> {
    let task_id = orch.submit_task(agent, task_type, payload).await?;
    let timeout = settings.orchestrator.response_timeout();
    orch.wait_for_responses(agent, 1, timeout)
        .await?
        .into_iter()
        .next()
        .with_context(|| {
            format!(
                "task {} did not finish within {}s",
                task_id,
                timeout.as_secs()
            )
        })
}

// Command implementations

async fn cmd_query(settings: &Settings, text: &str) -> Result<()> {
    let orch = Orchestrator::from_settings(settings);
    let agent = orch.create_agent("SearchAgent", ["search"]).await;

    let task = run_task(&orch, settings, &agent, "query", json!({ "query": text })).await;
    orch.shutdown().await;
    print_json(&task?)
}

async fn cmd_task(
    settings: &Settings,
    task_type: &str,
    payload: &str,
    capabilities: &[String],
) -> Result<()> {
    let payload: Value = serde_json::from_str(payload)
        .with_context(|| format!("payload is not valid JSON: {}", payload))?;

    let orch = Orchestrator::from_settings(settings);
    let agent = orch.create_agent("CliAgent", capabilities.iter().cloned()).await;

    let task = run_task(&orch, settings, &agent, task_type, payload).await;
    orch.shutdown().await;
    print_json(&task?)
}

async fn cmd_demo(settings: &Settings) -> Result<()> {
    let orch = Orchestrator::from_settings(settings);
    let searcher = orch.create_agent("SearchAgent", ["search"]).await;
    let analyst = orch.create_agent("AnalysisAgent", ["analysis", "memory"]).await;
    orch.connect(&searcher, &analyst).await?;

    let outcome = demo_steps(&orch, settings, &searcher, &analyst).await;
    orch.shutdown().await;
    print_json(&outcome?)
}

async fn demo_steps(
    orch: &Orchestrator,
    settings: &Settings,
    searcher: &str,
    analyst: &str,
) -> Result<Value> {
    let search = run_task(
        orch,
        settings,
        searcher,
        "query",
        json!({ "query": "multi-agent coordination" }),
    )
    .await?;
    let search_output = search
        .result
        .as_ref()
        .and_then(|result| result.get("output"))
        .cloned()
        .unwrap_or(Value::Null);

    // Hand the raw results to the analyst over the connection.
    orch.send_message(searcher, analyst, search_output.clone())
        .await?;
    let inbox = orch.receive_messages(analyst, settings.orchestrator.poll_batch_size).await?;
    let received = inbox
        .first()
        .map(|envelope| envelope.content.clone())
        .unwrap_or(Value::Null);

    let processed = run_task(orch, settings, analyst, "process_search_results", received).await?;

    let urls = processed
        .result
        .as_ref()
        .and_then(|result| result.get("urls"))
        .cloned()
        .unwrap_or_else(|| json!([]));
    let stored = run_task(
        orch,
        settings,
        analyst,
        "memory",
        json!({
            "operation": "store",
            "key": "demo:urls",
            "value": urls,
            "tags": ["demo", "urls"],
        }),
    )
    .await?;

    let recalled = orch.memory_search(["demo"]).await;

    Ok(json!({
        "agents": orch.list_agents().await,
        "search": search,
        "messages_delivered": inbox.len(),
        "processed": processed,
        "stored": stored,
        "memory": recalled,
        "memory_stats": orch.memory_stats().await.to_string(),
    }))
}

fn cmd_config(settings: &Settings) -> Result<()> {
    let mut value = serde_json::to_value(settings)?;
    if settings.tools.api_key.is_some() {
        value["tools"]["api_key"] = json!("********");
    }
    print_json(&value)
}
