//! Analyzer error types.

use std::sync::Arc;

/// Errors from a privacy analysis request.
///
/// Variants fall into three classes: configuration (`MissingApiKey`,
/// `InvalidUrl`), network (`Http`, `Timeout`, `Network`) and protocol
/// (`Protocol`). Only network and protocol errors are retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyzeError {
    /// No API key is configured.
    #[error("missing API key: configure a Perplexity API key to enable analysis")]
    MissingApiKey,

    /// Target URL has no host to scope the search to.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-success HTTP response.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response could not be salvaged into an analysis.
    #[error("malformed response: {0}")]
    Protocol(String),
}

impl AnalyzeError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalyzeError::Http { .. } | AnalyzeError::Timeout | AnalyzeError::Network(_) | AnalyzeError::Protocol(_)
        )
    }
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { AnalyzeError::Timeout } else { AnalyzeError::Network(Arc::new(err)) }
    }
}
