//! get_analysis tool implementation.
//!
//! Reads the cached analysis for a URL without triggering a new one.

use chrono::Utc;
use privai_core::{AnalysisResult, url::normalize};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::orchestrator::Orchestrator;
use crate::tools::{json_result, require_url};

/// Parameters for the get_analysis tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetAnalysisParams {
    /// The page URL to look up.
    pub url: String,
}

/// Output from the get_analysis tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAnalysisOutput {
    /// The cache key the URL normalizes to.
    pub normalized_url: String,
    /// Whether a live entry exists.
    pub cached: bool,
    /// The cached analysis.
    pub analysis: Option<AnalysisResult>,
    /// ISO8601 time the entry was written.
    pub cached_at: Option<String>,
    /// Entry age in seconds.
    pub age_secs: Option<i64>,
}

/// Implementation of the get_analysis tool.
pub async fn get_analysis_impl(
    orchestrator: &Orchestrator, params: GetAnalysisParams,
) -> Result<CallToolResult, McpError> {
    let url = require_url(&params.url)?;
    let entry = orchestrator.cache().entry(url).await;
    let now_ms = Utc::now().timestamp_millis();

    let output = GetAnalysisOutput {
        normalized_url: normalize(url),
        cached: entry.is_some(),
        cached_at: entry
            .as_ref()
            .and_then(|e| e.written_at())
            .map(|t| t.to_rfc3339()),
        age_secs: entry.as_ref().map(|e| e.age_ms(now_ms) / 1000),
        analysis: entry.map(|e| e.data),
    };

    json_result(&output)
}
