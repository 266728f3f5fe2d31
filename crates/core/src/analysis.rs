//! Privacy analysis payload types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary stored for an analysis that could not be completed.
pub const FAILED_SUMMARY: &str =
    "Failed to analyze privacy policy. The analysis service may be temporarily unavailable.";

/// Recommendation stored alongside a failed analysis.
pub const FAILED_RECOMMENDATIONS: &str =
    "Please try again later or visit the website's privacy policy page manually.";

/// Summary used when the model answered but its JSON could not be parsed.
pub const UNPARSED_SUMMARY: &str = "Unable to parse privacy policy analysis. Please try again.";

/// Recommendation used when the model answer could not be parsed.
pub const UNPARSED_RECOMMENDATIONS: &str =
    "Visit the website's privacy policy page manually for more information.";

/// Coarse privacy risk classification.
///
/// Decoding is case-insensitive and never fails: anything that is not
/// low/medium/high becomes [`RiskLevel::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        }
    }

    /// Parse a risk level as the model spells it.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        RiskLevel::parse(&value)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privacy posture of one website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Whether a privacy policy was found.
    #[serde(default)]
    pub accessible: bool,
    pub risk_level: RiskLevel,
    pub summary: String,
    #[serde(default)]
    pub recommendations: String,
    /// Set on results cached after a failed analysis.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl AnalysisResult {
    /// Result cached when the analyzer gave up, so the site is not retried
    /// until the entry expires or is cleared.
    pub fn failed() -> Self {
        Self {
            accessible: false,
            risk_level: RiskLevel::Unknown,
            summary: FAILED_SUMMARY.to_string(),
            recommendations: FAILED_RECOMMENDATIONS.to_string(),
            error: true,
        }
    }

    /// Degraded result for model output that held no parseable JSON.
    pub fn unparsed() -> Self {
        Self {
            accessible: false,
            risk_level: RiskLevel::Medium,
            summary: UNPARSED_SUMMARY.to_string(),
            recommendations: UNPARSED_RECOMMENDATIONS.to_string(),
            error: false,
        }
    }
}
