//! The analyzer seam between the orchestrator and a remote model.

use async_trait::async_trait;
use privai_core::AnalysisResult;

use crate::error::AnalyzeError;

/// Produces a privacy analysis for a page URL.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze `url` using `api_key`.
    ///
    /// Implementations own their retry policy; an error returned here is
    /// final for this request.
    async fn analyze(&self, url: &str, api_key: &str) -> Result<AnalysisResult, AnalyzeError>;
}
