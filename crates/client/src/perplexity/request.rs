//! Perplexity chat completion request types and prompt construction.

use serde::Serialize;

/// System instruction constraining the model to JSON-only answers.
pub const SYSTEM_PROMPT: &str =
    "You are a privacy policy analysis expert. You always respond with valid JSON only, no additional text.";

/// Chat completion request body.
///
/// Based on the Perplexity chat completions API:
/// https://docs.perplexity.ai/api-reference/chat-completions
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub return_citations: bool,
    /// Restricts the model's web search to these domains.
    pub search_domain_filter: Vec<String>,
    /// Search recency window: day|week|month|year.
    pub search_recency_filter: String,
}

/// One message in the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Sampling and search parameters shared by every analysis request.
#[derive(Debug, Clone)]
pub struct RequestParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub search_recency: String,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            model: "sonar".to_string(),
            max_tokens: 1000,
            temperature: 0.2,
            top_p: 0.9,
            search_recency: "month".to_string(),
        }
    }
}

impl ChatRequest {
    /// Build the analysis request for `url`, scoping search to `host`.
    pub fn for_url(url: &str, host: &str, params: &RequestParams) -> Self {
        Self {
            model: params.model.clone(),
            messages: vec![
                ChatMessage { role: Role::System, content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: Role::User, content: analysis_prompt(url) },
            ],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            return_citations: false,
            search_domain_filter: vec![host.to_string()],
            search_recency_filter: params.search_recency.clone(),
        }
    }
}

/// User prompt embedding the target URL and the required answer schema.
pub fn analysis_prompt(url: &str) -> String {
    format!(
        r#"Analyze the privacy policy of the website: {url}

Please search for and analyze the privacy policy of this website. Provide your analysis in the following JSON format ONLY, with no additional text or explanation:

{{
    "accessible": true or false (whether a privacy policy exists and is accessible),
    "riskLevel": "Low" or "Medium" or "High",
    "summary": "A brief 2-3 sentence summary of the key privacy concerns",
    "recommendations": "Specific user recommendations based on the privacy policy (2-3 sentences)"
}}

Risk Level Guidelines:
- Low: Clear privacy policy, minimal data collection, transparent practices, strong user controls
- Medium: Some data collection concerns, third-party sharing, or unclear sections
- High: Extensive data collection, broad sharing rights, vague terms, or no accessible privacy policy

Respond ONLY with the JSON object, nothing else."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let req = ChatRequest::for_url("https://example.com/page", "example.com", &RequestParams::default());
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "sonar");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["return_citations"], false);
        assert_eq!(json["search_domain_filter"], serde_json::json!(["example.com"]));
        assert_eq!(json["search_recency_filter"], "month");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_low_temperature() {
        let params = RequestParams::default();
        assert!(params.temperature <= 0.2);
        assert!(params.top_p < 1.0);
    }

    #[test]
    fn test_prompt_embeds_url_and_schema() {
        let prompt = analysis_prompt("https://example.com/page");
        assert!(prompt.contains("https://example.com/page"));
        assert!(prompt.contains("\"riskLevel\": \"Low\" or \"Medium\" or \"High\""));
        assert!(prompt.contains("\"accessible\""));
        assert!(prompt.contains("\"recommendations\""));
    }
}
