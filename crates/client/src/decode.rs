//! Decoding model output into a typed analysis.
//!
//! The model is asked for bare JSON but often wraps it in prose or code
//! fences. Decoding proceeds in two steps:
//!
//! 1. **Extraction**: take the span from the first `{` to the last `}` and
//!    parse it; with no braces at all, parse the whole text. If parsing
//!    fails the output is degraded to [`AnalysisResult::unparsed`] instead
//!    of failing the request.
//! 2. **Validation**: the parsed value must be an object with non-empty
//!    string `riskLevel` and `summary`. Anything else is a protocol error.

use std::sync::LazyLock;

use privai_core::{AnalysisResult, RiskLevel};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::AnalyzeError;

static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Decode model output text into an analysis.
///
/// # Errors
///
/// Returns `AnalyzeError::Protocol` when the output parses as JSON but lacks
/// the required fields.
pub fn decode_analysis(content: &str) -> Result<AnalysisResult, AnalyzeError> {
    match extract_json(content) {
        Ok(value) => validate(value),
        Err(e) => {
            tracing::warn!(error = %e, "model output held no parseable JSON, using fallback analysis");
            Ok(AnalysisResult::unparsed())
        }
    }
}

fn extract_json(content: &str) -> Result<Value, serde_json::Error> {
    match JSON_OBJECT.find(content) {
        Some(m) => serde_json::from_str(m.as_str()),
        None => serde_json::from_str(content.trim()),
    }
}

fn validate(value: Value) -> Result<AnalysisResult, AnalyzeError> {
    let Value::Object(obj) = value else {
        return Err(AnalyzeError::Protocol("analysis is not a JSON object".into()));
    };

    let risk_level = required_str(&obj, "riskLevel")?;
    let summary = required_str(&obj, "summary")?;

    Ok(AnalysisResult {
        accessible: obj.get("accessible").and_then(Value::as_bool).unwrap_or(false),
        risk_level: RiskLevel::parse(risk_level),
        summary: summary.to_string(),
        recommendations: obj
            .get("recommendations")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        error: false,
    })
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str, AnalyzeError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AnalyzeError::Protocol(format!("analysis is missing \"{field}\"")))
}
