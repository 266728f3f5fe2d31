//! analyze_now tool implementation.
//!
//! Forces a fresh analysis of a URL, bypassing the cache.

use privai_core::{AnalysisResult, Error, url::is_web_url};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{json_result, require_url};
use crate::orchestrator::Orchestrator;

/// Parameters for the analyze_now tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeNowParams {
    /// The page URL to analyze.
    pub url: String,
}

/// Output from the analyze_now tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeNowOutput {
    /// Whether the analyzer produced a result.
    pub success: bool,
    /// Failure reason when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The analysis now stored for the URL.
    pub analysis: AnalysisResult,
}

/// Implementation of the analyze_now tool.
pub async fn analyze_now_impl(
    orchestrator: &Orchestrator, params: AnalyzeNowParams,
) -> Result<CallToolResult, McpError> {
    let url = require_url(&params.url)?;
    if !is_web_url(url) {
        return Err(Error::InvalidInput(format!("not an http(s) URL: {url}")).into());
    }

    let analysis = orchestrator.analyze_now(url).await;
    let error = analysis.error().map(String::from);
    let result = analysis.result().cloned().unwrap_or_else(AnalysisResult::failed);

    json_result(&AnalyzeNowOutput { success: error.is_none(), error, analysis: result })
}
