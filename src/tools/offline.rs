//! Offline tool invoker with deterministic canned responses.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::invoker::{FailureCode, ToolError, ToolInvoker, ANALYZE_REPOSITORY, SCRAPE_URL, WEB_SEARCH};

/// Answers the built-in capabilities locally, without network access.
#[derive(Debug, Default, Clone)]
pub struct OfflineInvoker;

fn slug(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[async_trait]
impl ToolInvoker for OfflineInvoker {
    async fn invoke(&self, capability: &str, parameters: Value) -> Result<Value, ToolError> {
        match capability {
            WEB_SEARCH => {
                let query = parameters
                    .get("query")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let s = slug(query);
                Ok(json!({
                    "query": query,
                    "results": [
                        {
                            "title": format!("Overview of {}", query),
                            "url": format!("https://en.wikipedia.org/wiki/{}", s),
                        },
                        {
                            "title": format!("{} on GitHub", query),
                            "url": format!("https://github.com/topics/{}", s),
                        },
                    ],
                }))
            }
            ANALYZE_REPOSITORY => {
                let repo = parameters
                    .get("repo")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                Ok(json!({
                    "repo": repo,
                    "languages": [],
                    "files_analyzed": 0,
                    "offline": true,
                }))
            }
            SCRAPE_URL => {
                let url = parameters.get("url").and_then(Value::as_str).unwrap_or_default();
                Ok(json!({
                    "url": url,
                    "content": "",
                    "offline": true,
                }))
            }
            other => Err(ToolError::new(
                other,
                FailureCode::NotFound,
                format!("unknown capability '{}' in offline mode", other),
            )),
        }
    }
}
