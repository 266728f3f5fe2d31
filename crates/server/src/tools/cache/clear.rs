//! clear_cache and clear_all_cache tool implementations.
//!
//! Storage failures are reported in the output rather than as protocol
//! errors, so clients always get a `success` flag back.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::orchestrator::Orchestrator;
use crate::tools::{json_result, require_url};

/// Parameters for the clear_cache tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearCacheParams {
    /// The page URL whose cached analysis should be dropped.
    pub url: String,
}

/// Output from the clear_cache and clear_all_cache tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearCacheOutput {
    pub success: bool,
    /// Number of entries removed.
    pub removed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Implementation of the clear_cache tool.
pub async fn clear_cache_impl(orchestrator: &Orchestrator, params: ClearCacheParams) -> Result<CallToolResult, McpError> {
    let url = require_url(&params.url)?;

    let output = match orchestrator.cache().remove(url).await {
        Ok(existed) => {
            tracing::info!(url, existed, "cleared cached analysis");
            ClearCacheOutput { success: true, removed: u64::from(existed), error: None }
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "failed to clear cached analysis");
            ClearCacheOutput { success: false, removed: 0, error: Some(e.to_string()) }
        }
    };

    json_result(&output)
}

/// Implementation of the clear_all_cache tool.
pub async fn clear_all_cache_impl(orchestrator: &Orchestrator) -> Result<CallToolResult, McpError> {
    let output = match orchestrator.cache().clear_all().await {
        Ok(removed) => ClearCacheOutput { success: true, removed, error: None },
        Err(e) => {
            tracing::warn!(error = %e, "failed to clear analysis cache");
            ClearCacheOutput { success: false, removed: 0, error: Some(e.to_string()) }
        }
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use privai_core::credentials::API_KEY_STORE_KEY;
    use privai_core::{KvStore, RiskLevel};
    use serde_json::Value;

    use super::*;
    use crate::orchestrator::testing::{FakeAnalyzer, TEST_KEY, orchestrator};
    use crate::tools::test_support::output;

    #[tokio::test]
    async fn test_clear_cache_forces_reanalysis() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::Low));
        let (orch, _store) = orchestrator(analyzer.clone());
        orch.ensure_analyzed("https://example.com/a").await;

        let params = ClearCacheParams { url: "https://EXAMPLE.com/a?x=2".into() };
        let out: ClearCacheOutput = output(&clear_cache_impl(&orch, params).await.unwrap());
        assert!(out.success);
        assert_eq!(out.removed, 1);

        orch.ensure_analyzed("https://example.com/a").await;
        assert_eq!(analyzer.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_missing_entry() {
        let (orch, _store) = orchestrator(Arc::new(FakeAnalyzer::ok(RiskLevel::Low)));

        let params = ClearCacheParams { url: "https://example.com/".into() };
        let out: ClearCacheOutput = output(&clear_cache_impl(&orch, params).await.unwrap());
        assert!(out.success);
        assert_eq!(out.removed, 0);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_credential() {
        let (orch, store) = orchestrator(Arc::new(FakeAnalyzer::ok(RiskLevel::Medium)));
        store.put(API_KEY_STORE_KEY, Value::String(TEST_KEY.into())).await.unwrap();
        orch.ensure_analyzed("https://a.example/").await;
        orch.ensure_analyzed("https://b.example/").await;

        let out: ClearCacheOutput = output(&clear_all_cache_impl(&orch).await.unwrap());
        assert!(out.success);
        assert_eq!(out.removed, 2);

        assert!(orch.cache().get("https://a.example/").await.is_none());
        assert!(orch.cache().get("https://b.example/").await.is_none());
        assert!(store.get(API_KEY_STORE_KEY).await.unwrap().is_some());
    }
}
