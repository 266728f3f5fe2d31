//! Persisted cache entry format.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;

/// Key prefix shared by every cached analysis.
pub const ANALYSIS_KEY_PREFIX: &str = "analysis_";

/// One cached analysis as stored under `analysis_<normalized url>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: AnalysisResult,
    /// Write time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The URL as it was seen before normalization.
    pub url: String,
}

impl CacheEntry {
    pub fn new(url: &str, data: AnalysisResult, timestamp: i64) -> Self {
        Self { data, timestamp, url: url.to_string() }
    }

    /// Age of the entry at `now_ms`; negative ages from clock skew count as zero.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp).max(0)
    }

    pub fn written_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Storage key for an already-normalized URL.
pub fn storage_key(normalized_url: &str) -> String {
    format!("{ANALYSIS_KEY_PREFIX}{normalized_url}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RiskLevel;

    #[test]
    fn test_entry_wire_format() {
        let entry = CacheEntry::new(
            "https://example.com/page?x=1",
            AnalysisResult {
                accessible: true,
                risk_level: RiskLevel::High,
                summary: "s".into(),
                recommendations: "r".into(),
                error: false,
            },
            1_700_000_000_000,
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
        assert_eq!(json["url"], "https://example.com/page?x=1");
        assert_eq!(json["data"]["riskLevel"], "High");
    }

    #[test]
    fn test_age_clamps_future_timestamps() {
        let entry = CacheEntry::new("u", AnalysisResult::failed(), 2_000);
        assert_eq!(entry.age_ms(5_000), 3_000);
        assert_eq!(entry.age_ms(1_000), 0);
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("https://example.com/"), "analysis_https://example.com/");
    }
}
