//! MCP tool implementations.
//!
//! This module contains all tools exposed by the privai server. Each tool
//! returns its output as pretty-printed JSON text.

pub mod analyze;
pub mod cache;
pub mod settings;
pub mod tabs;

use privai_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use analyze::{AnalyzeNowParams, analyze_now_impl};
pub use cache::{ClearCacheParams, GetAnalysisParams, clear_all_cache_impl, clear_cache_impl, get_analysis_impl};
pub use settings::{SetApiKeyParams, api_key_status_impl, set_api_key_impl};
pub use tabs::{
    TabActivatedParams, TabRemovedParams, TabUpdatedParams, get_badge_impl, get_current_url_impl, tab_activated_impl,
    tab_removed_impl, tab_updated_impl,
};

/// Serialize a tool's output into a successful result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::Serialization(format!("Failed to serialize tool output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Reject blank URLs before they reach the cache or analyzer.
pub(crate) fn require_url(url: &str) -> Result<&str, McpError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    Ok(url)
}

#[cfg(test)]
pub(crate) mod test_support {
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;

    /// Parse the JSON text payload of a tool result.
    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
