//! Tab event and indicator tools.
//!
//! Clients forward browser tab events here; the router decides whether they
//! lead to an analysis.

use privai_core::AnalysisResult;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::badge::Badge;
use crate::orchestrator::Analysis;
use crate::router::{TabId, TabRouter};

/// Parameters for the tab_updated tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabUpdatedParams {
    pub tab_id: TabId,
    /// Load status reported by the browser ("loading" or "complete").
    pub status: String,
    /// The tab's URL, if it changed or is known.
    #[serde(default)]
    pub url: Option<String>,
}

/// Parameters for the tab_activated tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabActivatedParams {
    pub tab_id: TabId,
    #[serde(default)]
    pub url: Option<String>,
}

/// Parameters for the tab_removed tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabRemovedParams {
    pub tab_id: TabId,
}

/// Result of routing a tab event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabEventOutput {
    pub tab_id: TabId,
    /// One of ignored, skipped, cached, fresh, failed or removed.
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TabEventOutput {
    fn from_analysis(tab_id: TabId, analysis: Option<Analysis>) -> Self {
        match analysis {
            Some(analysis) => Self {
                tab_id,
                outcome: analysis.outcome().to_string(),
                error: analysis.error().map(String::from),
                analysis: analysis.result().cloned(),
            },
            None => Self { tab_id, outcome: "ignored".into(), analysis: None, error: None },
        }
    }
}

/// Output from the get_current_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CurrentUrlOutput {
    pub url: Option<String>,
}

/// Implementation of the get_current_url tool.
pub async fn get_current_url_impl(router: &TabRouter) -> Result<CallToolResult, McpError> {
    json_result(&CurrentUrlOutput { url: router.current_url() })
}

/// Implementation of the tab_updated tool.
pub async fn tab_updated_impl(router: &TabRouter, params: TabUpdatedParams) -> Result<CallToolResult, McpError> {
    let analysis = router
        .on_updated(params.tab_id, &params.status, params.url.as_deref())
        .await;
    json_result(&TabEventOutput::from_analysis(params.tab_id, analysis))
}

/// Implementation of the tab_activated tool.
pub async fn tab_activated_impl(router: &TabRouter, params: TabActivatedParams) -> Result<CallToolResult, McpError> {
    let analysis = router.on_activated(params.tab_id, params.url.as_deref()).await;
    json_result(&TabEventOutput::from_analysis(params.tab_id, Some(analysis)))
}

/// Implementation of the tab_removed tool.
pub async fn tab_removed_impl(router: &TabRouter, params: TabRemovedParams) -> Result<CallToolResult, McpError> {
    let known = router.on_removed(params.tab_id);
    let outcome = if known { "removed" } else { "ignored" };
    json_result(&TabEventOutput { tab_id: params.tab_id, outcome: outcome.into(), analysis: None, error: None })
}

/// Implementation of the get_badge tool.
pub async fn get_badge_impl(badge: &Badge) -> Result<CallToolResult, McpError> {
    json_result(&badge.state().view())
}
