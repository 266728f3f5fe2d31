//! Perplexity chat completions client.
//!
//! Asks Perplexity's online model for a privacy-policy assessment of a page
//! and decodes the answer into an [`AnalysisResult`].
//!
//! ### Specification
//!
//! - **Endpoint**: `https://api.perplexity.ai/chat/completions` (POST)
//! - **Authentication**: Bearer token.
//! - **Search scope**: restricted to the page's host, past month.
//! - **Retries**: network and protocol failures are retried a fixed number
//!   of times with a fixed delay; configuration errors are not.
//! - **Decoding**: see [`crate::decode`].

pub mod request;
pub mod response;

pub use request::{ChatMessage, ChatRequest, RequestParams, Role};
pub use response::ChatResponse;

use async_trait::async_trait;
use privai_core::{AnalysisResult, AppConfig};
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::analyzer::Analyzer;
use crate::decode::decode_analysis;
use crate::error::AnalyzeError;

/// Default chat completions endpoint.
const DEFAULT_API_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "privai/0.1";

/// Default number of additional attempts after a failure.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Perplexity client configuration.
#[derive(Debug, Clone)]
pub struct PerplexityConfig {
    /// Endpoint URL (default: https://api.perplexity.ai/chat/completions).
    pub api_url: String,
    /// Request timeout (default: 30s).
    pub timeout: Duration,
    /// User-agent string (default: privai/0.x).
    pub user_agent: String,
    /// Model and sampling parameters.
    pub params: RequestParams,
    /// Additional attempts after a retryable failure (default: 2).
    pub max_retries: u32,
    /// Fixed delay between attempts (default: 1s).
    pub retry_delay: Duration,
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            params: RequestParams::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl PerplexityConfig {
    /// Client settings taken from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            params: RequestParams { model: config.model.clone(), ..Default::default() },
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }
}

/// Perplexity API client.
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    http: reqwest::Client,
    config: PerplexityConfig,
}

impl PerplexityClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PerplexityConfig) -> Result<Self, AnalyzeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AnalyzeError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// One request/response round trip, without retries.
    async fn attempt(&self, url: &str, host: &str, api_key: &str) -> Result<AnalysisResult, AnalyzeError> {
        let start = Instant::now();
        let body = ChatRequest::for_url(url, host, &self.config.params);

        tracing::debug!(url, model = %body.model, "requesting privacy analysis");

        let http_response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!(%status, "Perplexity API response status");

        if !status.is_success() {
            let body = http_response.text().await.unwrap_or_default();
            return Err(AnalyzeError::Http { status: status.as_u16(), body });
        }

        let bytes = http_response.bytes().await?;
        let response: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AnalyzeError::Protocol(format!("undecodable response body: {e}")))?;

        let content = response
            .content()
            .ok_or_else(|| AnalyzeError::Protocol("no content in Perplexity response".into()))?;

        tracing::debug!(elapsed = ?start.elapsed(), id = ?response.id, "analysis answer received");

        decode_analysis(content)
    }
}

#[async_trait]
impl Analyzer for PerplexityClient {
    async fn analyze(&self, url: &str, api_key: &str) -> Result<AnalysisResult, AnalyzeError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AnalyzeError::MissingApiKey);
        }

        let host = privai_core::url::host(url).ok_or_else(|| AnalyzeError::InvalidUrl(url.to_string()))?;

        let mut retries = 0;
        loop {
            match self.attempt(url, &host, api_key).await {
                Ok(result) => {
                    tracing::info!(url, risk = %result.risk_level, "privacy analysis completed");
                    return Ok(result);
                }
                Err(e) if e.is_retryable() && retries < self.config.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        url,
                        error = %e,
                        retry = retries,
                        max_retries = self.config.max_retries,
                        "analysis attempt failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(url, error = %e, "privacy analysis failed");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use privai_core::RiskLevel;
    use serde_json::json;

    const API_KEY: &str = "pplx-test-key";

    fn client_for(server: &mockito::Server, max_retries: u32) -> PerplexityClient {
        PerplexityClient::new(PerplexityConfig {
            api_url: format!("{}/chat/completions", server.url()),
            max_retries,
            retry_delay: Duration::from_millis(5),
            ..Default::default()
        })
        .unwrap()
    }

    fn answer(content: &str) -> String {
        json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_analyze_embedded_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", format!("Bearer {API_KEY}").as_str())
            .match_body(Matcher::PartialJson(json!({
                "model": "sonar",
                "return_citations": false,
                "search_domain_filter": ["example.com"],
                "search_recency_filter": "month"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(answer("Some text {\"riskLevel\":\"Low\",\"summary\":\"ok\"} trailing"))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, DEFAULT_MAX_RETRIES);
        let result = client.analyze("https://example.com/page?x=1", API_KEY).await.unwrap();

        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.summary, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_failure_exhausts_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream down")
            .expect(DEFAULT_MAX_RETRIES as usize + 1)
            .create_async()
            .await;

        let client = client_for(&server, DEFAULT_MAX_RETRIES);
        let err = client.analyze("https://example.com/", API_KEY).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Http { status: 500, ref body } if body == "upstream down"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retries_wait_between_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(502)
            .expect(DEFAULT_MAX_RETRIES as usize + 1)
            .create_async()
            .await;

        let retry_delay = Duration::from_millis(50);
        let client = PerplexityClient::new(PerplexityConfig {
            api_url: format!("{}/chat/completions", server.url()),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay,
            ..Default::default()
        })
        .unwrap();

        let start = Instant::now();
        let err = client.analyze("https://example.com/", API_KEY).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Http { status: 502, .. }));
        assert!(start.elapsed() >= retry_delay * DEFAULT_MAX_RETRIES);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_content_is_retried_as_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"id":"x","choices":[]}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, 1);
        let err = client.analyze("https://example.com/", API_KEY).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Protocol(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparseable_answer_degrades_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(answer("I could not find a privacy policy."))
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, DEFAULT_MAX_RETRIES);
        let result = client.analyze("https://example.com/", API_KEY).await.unwrap();

        assert_eq!(result, AnalysisResult::unparsed());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/chat/completions").expect(0).create_async().await;

        let client = client_for(&server, DEFAULT_MAX_RETRIES);
        let err = client.analyze("https://example.com/", "  ").await.unwrap_err();

        assert!(matches!(err, AnalyzeError::MissingApiKey));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/chat/completions").expect(0).create_async().await;

        let client = client_for(&server, DEFAULT_MAX_RETRIES);
        let err = client.analyze("not a url", API_KEY).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::InvalidUrl(_)));
        mock.assert_async().await;
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig { model: "sonar-pro".into(), max_retries: 4, retry_delay_ms: 250, ..Default::default() };
        let config = PerplexityConfig::from_app_config(&app);
        assert_eq!(config.params.model, "sonar-pro");
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
