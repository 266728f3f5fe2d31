//! API key setup tools.
//!
//! Replacing the key drops cached failures, since most of them were caused
//! by the missing or rejected key.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::orchestrator::Orchestrator;

/// Parameters for the set_api_key tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetApiKeyParams {
    /// Perplexity API key, starting with "pplx-".
    pub api_key: String,
}

/// Output from the set_api_key tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetApiKeyOutput {
    pub success: bool,
    /// Number of cached failures dropped after the key changed.
    pub cleared_failures: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output from the api_key_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiKeyStatusOutput {
    pub configured: bool,
    /// The key with everything but its prefix and last four characters hidden.
    pub masked: Option<String>,
}

/// Implementation of the set_api_key tool.
pub async fn set_api_key_impl(orchestrator: &Orchestrator, params: SetApiKeyParams) -> Result<CallToolResult, McpError> {
    if let Err(e) = orchestrator.credentials().set_api_key(&params.api_key).await {
        tracing::warn!(error = %e, "rejected API key");
        return json_result(&SetApiKeyOutput { success: false, cleared_failures: 0, error: Some(e.to_string()) });
    }

    let cleared_failures = orchestrator.cache().clear_failures().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to clear cached failures");
        0
    });

    json_result(&SetApiKeyOutput { success: true, cleared_failures, error: None })
}

/// Implementation of the api_key_status tool.
pub async fn api_key_status_impl(orchestrator: &Orchestrator) -> Result<CallToolResult, McpError> {
    let key = orchestrator.credentials().api_key().await;
    json_result(&ApiKeyStatusOutput { configured: key.is_some(), masked: key.as_deref().map(mask) })
}

fn mask(key: &str) -> String {
    let prefix: String = key.chars().take(5).collect();
    let suffix: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{prefix}...{suffix}")
}
