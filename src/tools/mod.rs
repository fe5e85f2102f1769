//! Tool invocation boundary.
//!
//! Task handlers reach every external service (search, repository analysis,
//! scraping, arbitrary functions) through [`ToolInvoker::invoke`]. How a
//! capability is fulfilled is up to the invoker implementation.

use std::sync::Arc;

pub mod contract;
pub mod http;
pub mod invoker;
pub mod offline;

pub use contract::{ContractInvoker, ExecutionContract};
pub use http::HttpToolInvoker;
pub use invoker::{FailureCode, FnInvoker, ToolError, ToolInvoker};
pub use offline::OfflineInvoker;

use crate::config::ToolSettings;

/// Build the invoker described by the tool settings, wrapped in its execution contract.
pub fn create_invoker(settings: &ToolSettings) -> Arc<dyn ToolInvoker> {
    let inner: Arc<dyn ToolInvoker> = if settings.offline {
        Arc::new(OfflineInvoker)
    } else {
        Arc::new(HttpToolInvoker::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
        ))
    };
    Arc::new(ContractInvoker::new(
        inner,
        ExecutionContract::from_settings(settings),
    ))
}
