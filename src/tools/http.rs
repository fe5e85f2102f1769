//! HTTP-backed tool invoker.
//!
//! Each capability maps to `POST {base_url}/{capability}` with the parameters
//! as the JSON body. The gateway behind that URL is responsible for reaching
//! the search, repository, and scraping services.

use async_trait::async_trait;
use serde_json::Value;

use super::invoker::{FailureCode, ToolError, ToolInvoker};

pub struct HttpToolInvoker {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpToolInvoker {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, capability: &str) -> String {
        format!("{}/{}", self.base_url, capability)
    }
}

fn status_code(status: reqwest::StatusCode) -> FailureCode {
    match status.as_u16() {
        401 | 403 => FailureCode::Unauthorized,
        404 => FailureCode::NotFound,
        408 | 504 => FailureCode::Timeout,
        429 | 502 | 503 => FailureCode::Unavailable,
        400..=499 => FailureCode::Rejected,
        _ => FailureCode::Unknown,
    }
}

#[async_trait]
impl ToolInvoker for HttpToolInvoker {
    async fn invoke(&self, capability: &str, parameters: Value) -> Result<Value, ToolError> {
        let url = self.endpoint(capability);
        tracing::debug!(capability, url = %url, "Invoking tool over HTTP");

        let mut request = self.client.post(&url).json(&parameters);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            let code = if e.is_timeout() {
                FailureCode::Timeout
            } else if e.is_connect() {
                FailureCode::Unavailable
            } else {
                FailureCode::Unknown
            };
            ToolError::new(capability, code, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::new(
                capability,
                status_code(status),
                format!("HTTP {}: {}", status, body),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::new(capability, FailureCode::Unknown, format!("invalid response body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let invoker = HttpToolInvoker::new("http://localhost:8700/tools/", None);
        assert_eq!(invoker.endpoint("web_search"), "http://localhost:8700/tools/web_search");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_code(reqwest::StatusCode::FORBIDDEN), FailureCode::Unauthorized);
        assert_eq!(status_code(reqwest::StatusCode::NOT_FOUND), FailureCode::NotFound);
        assert_eq!(status_code(reqwest::StatusCode::SERVICE_UNAVAILABLE), FailureCode::Unavailable);
        assert_eq!(status_code(reqwest::StatusCode::TOO_MANY_REQUESTS), FailureCode::Unavailable);
        assert_eq!(status_code(reqwest::StatusCode::BAD_REQUEST), FailureCode::Rejected);
        assert_eq!(status_code(reqwest::StatusCode::UNPROCESSABLE_ENTITY), FailureCode::Rejected);
        assert_eq!(status_code(reqwest::StatusCode::INTERNAL_SERVER_ERROR), FailureCode::Unknown);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_an_error() {
        // Port 9 (discard) is not expected to have an HTTP listener.
        let invoker = HttpToolInvoker::new("http://127.0.0.1:9", None);
        let err = invoker.invoke("web_search", serde_json::json!({})).await.unwrap_err();
        assert_eq!(err.capability, "web_search");
    }
}
