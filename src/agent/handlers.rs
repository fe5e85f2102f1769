//! Task handlers and the table that maps task kinds to them.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::task::{TaskError, TaskKind};
use crate::tools::invoker::{ANALYZE_REPOSITORY, SCRAPE_URL, WEB_SEARCH};

use super::TaskContext;

/// Runs one kind of task.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError>;
}

/// Mapping from task kind to handler.
#[derive(Clone)]
pub struct HandlerTable {
    handlers: HashMap<TaskKind, Arc<dyn TaskHandler>>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HandlerTable {
    /// A table with no handlers; every task fails as unrecognized.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The standard handler set.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.register(TaskKind::Query, Arc::new(QueryHandler));
        table.register(TaskKind::AnalyzeRepo, Arc::new(AnalyzeRepoHandler));
        table.register(TaskKind::ScrapeUrl, Arc::new(ScrapeUrlHandler));
        table.register(TaskKind::ProcessSearchResults, Arc::new(ProcessSearchResultsHandler));
        table.register(TaskKind::Memory, Arc::new(MemoryHandler));
        table.register(TaskKind::CallFunction, Arc::new(CallFunctionHandler));
        table
    }

    /// Install a handler, returning the one it replaced.
    pub fn register(
        &mut self,
        kind: TaskKind,
        handler: Arc<dyn TaskHandler>,
    ) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.insert(kind, handler)
    }

    pub fn get(&self, kind: TaskKind) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn contains(&self, kind: TaskKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

fn required_str<'a>(payload: &'a Value, field: &str) -> Result<&'a str, TaskError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TaskError::Validation(format!("payload field '{}' is required", field)))
}

fn with_field(payload: &Value, field: &str, value: &str) -> Value {
    let mut params = match payload {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    params.insert(field.to_string(), Value::String(value.to_string()));
    Value::Object(params)
}

fn string_list(payload: &Value, field: &str) -> Result<Vec<String>, TaskError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    TaskError::Validation(format!("payload field '{}' must hold strings", field))
                })
            })
            .collect(),
        Some(_) => Err(TaskError::Validation(format!(
            "payload field '{}' must be an array",
            field
        ))),
    }
}

/// `query`: web search through the tool boundary.
pub struct QueryHandler;

#[async_trait]
impl TaskHandler for QueryHandler {
    async fn handle(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let query = required_str(&payload, "query")?.to_string();
        let output = ctx.tools.invoke(WEB_SEARCH, payload).await?;
        Ok(json!({ "query": query, "output": output }))
    }
}

/// Repository reference named by a payload, if any.
pub fn repo_reference(payload: &Value) -> Option<String> {
    for field in ["repo", "repository", "repo_url"] {
        if let Ok(reference) = required_str(payload, field) {
            return Some(reference.to_string());
        }
    }
    let owner = required_str(payload, "owner").ok()?;
    let name = required_str(payload, "name").ok()?;
    Some(format!("{}/{}", owner, name))
}

/// `analyze_repo`: repository analysis through the tool boundary.
pub struct AnalyzeRepoHandler;

#[async_trait]
impl TaskHandler for AnalyzeRepoHandler {
    async fn handle(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let repo = repo_reference(&payload).ok_or_else(|| {
            TaskError::Validation(
                "a repository reference is required (repo, repository, repo_url, or owner + name)"
                    .to_string(),
            )
        })?;
        let output = ctx
            .tools
            .invoke(ANALYZE_REPOSITORY, with_field(&payload, "repo", &repo))
            .await?;
        Ok(json!({ "repo": repo, "analysis": output }))
    }
}

/// `scrape_url`: content extraction through the tool boundary.
pub struct ScrapeUrlHandler;

#[async_trait]
impl TaskHandler for ScrapeUrlHandler {
    async fn handle(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let url = required_str(&payload, "url")?.to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TaskError::Validation(format!(
                "url must be http(s), got '{}'",
                url
            )));
        }
        let output = ctx.tools.invoke(SCRAPE_URL, payload).await?;
        Ok(json!({ "url": url, "content": output }))
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Every http(s) URL found in the string values of `value`, first-seen order, no repeats.
pub fn extract_urls(value: &Value) -> Result<Vec<String>, TaskError> {
    let re = Regex::new(r#"https?://[^\s"'<>\)\]]+"#)
        .map_err(|e| TaskError::Handler(format!("url pattern: {}", e)))?;

    let mut strings = Vec::new();
    collect_strings(value, &mut strings);

    let mut urls: Vec<String> = Vec::new();
    for s in strings {
        for m in re.find_iter(s) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']);
            if !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
    }
    Ok(urls)
}

/// `process_search_results`: local URL extraction, no tool call.
pub struct ProcessSearchResultsHandler;

#[async_trait]
impl TaskHandler for ProcessSearchResultsHandler {
    async fn handle(&self, _ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let urls = extract_urls(&payload)?;
        Ok(json!({ "count": urls.len(), "urls": urls }))
    }
}

/// `memory`: store / retrieve / search / delete against the shared store.
pub struct MemoryHandler;

#[async_trait]
impl TaskHandler for MemoryHandler {
    async fn handle(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let operation = required_str(&payload, "operation")?;
        match operation {
            "store" => {
                let key = required_str(&payload, "key")?;
                let value = payload.get("value").cloned().ok_or_else(|| {
                    TaskError::Validation("payload field 'value' is required".to_string())
                })?;
                let tags = string_list(&payload, "tags")?;
                ctx.memory.store(key, value, tags).await;
                Ok(json!({ "operation": "store", "key": key }))
            }
            "retrieve" => {
                let key = required_str(&payload, "key")?;
                Ok(match ctx.memory.retrieve(key).await {
                    Some(value) => json!({ "operation": "retrieve", "key": key, "found": true, "value": value }),
                    None => json!({ "operation": "retrieve", "key": key, "found": false }),
                })
            }
            "search" => {
                let tags = string_list(&payload, "tags")?;
                let entries = ctx.memory.search(tags).await;
                let entries = serde_json::to_value(&entries)
                    .map_err(|e| TaskError::Handler(e.to_string()))?;
                let count = entries.as_array().map_or(0, Vec::len);
                Ok(json!({ "operation": "search", "count": count, "entries": entries }))
            }
            "delete" => {
                let key = required_str(&payload, "key")?;
                let deleted = ctx.memory.delete(key).await;
                Ok(json!({ "operation": "delete", "key": key, "deleted": deleted }))
            }
            other => Err(TaskError::Validation(format!(
                "unknown memory operation '{}' (expected store, retrieve, search, or delete)",
                other
            ))),
        }
    }
}

/// `call_function`: forwards a named call with arbitrary parameters.
pub struct CallFunctionHandler;

#[async_trait]
impl TaskHandler for CallFunctionHandler {
    async fn handle(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let function = required_str(&payload, "function")?.to_string();
        let parameters = payload
            .get("parameters")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = ctx.tools.invoke(&function, parameters).await?;
        Ok(json!({ "function": function, "output": output }))
    }
}
