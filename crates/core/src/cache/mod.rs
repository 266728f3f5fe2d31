//! TTL cache of privacy analyses keyed by normalized URL.
//!
//! Entries live in the injected [`KvStore`] under `analysis_<normalized url>`.
//! An entry is valid while `now - timestamp < ttl`; expired entries are
//! removed lazily by the lookup that notices them. Reads and writes that fail
//! at the storage layer are logged and degrade to "absent" / no-op so the
//! analysis flow is never blocked by the cache.

pub mod entry;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::Error;
use crate::analysis::AnalysisResult;
use crate::store::KvStore;
use crate::url::normalize;

pub use entry::{ANALYSIS_KEY_PREFIX, CacheEntry, storage_key};

/// Default time-to-live for cached analyses (7 days).
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Analysis cache over a shared key-value store.
#[derive(Clone)]
pub struct AnalysisCache {
    store: Arc<dyn KvStore>,
    ttl_ms: i64,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX) }
    }

    /// Cached analysis for `url`, if present and not expired.
    pub async fn get(&self, url: &str) -> Option<AnalysisResult> {
        self.entry(url).await.map(|entry| entry.data)
    }

    /// Cached entry for `url` including its write time.
    pub async fn entry(&self, url: &str) -> Option<CacheEntry> {
        let normalized = normalize(url);
        let key = storage_key(&normalized);

        let value = match self.store.get(&key).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, url = %normalized, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, url = %normalized, "discarding undecodable cache entry");
                self.evict(&key).await;
                return None;
            }
        };

        if entry.age_ms(Utc::now().timestamp_millis()) >= self.ttl_ms {
            tracing::debug!(url = %normalized, "cache entry expired");
            self.evict(&key).await;
            return None;
        }

        Some(entry)
    }

    /// Write or overwrite the analysis for `url`, stamped with the current time.
    pub async fn put(&self, url: &str, result: &AnalysisResult) {
        let normalized = normalize(url);
        let entry = CacheEntry::new(url, result.clone(), Utc::now().timestamp_millis());

        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, url = %normalized, "failed to encode cache entry");
                return;
            }
        };

        match self.store.put(&storage_key(&normalized), value).await {
            Ok(()) => tracing::debug!(url = %normalized, risk = %result.risk_level, "analysis cached"),
            Err(e) => tracing::warn!(error = %e, url = %normalized, "failed to cache analysis"),
        }
    }

    /// Remove the entry for `url`, returning whether one existed.
    pub async fn remove(&self, url: &str) -> Result<bool, Error> {
        self.store.remove(&storage_key(&normalize(url))).await
    }

    /// Remove every cached analysis, leaving unrelated keys untouched.
    pub async fn clear_all(&self) -> Result<u64, Error> {
        let removed = self.store.clear_prefix(ANALYSIS_KEY_PREFIX).await?;
        tracing::info!(removed, "cleared analysis cache");
        Ok(removed)
    }

    /// Remove cached failures so those sites are analyzed again on next visit.
    pub async fn clear_failures(&self) -> Result<u64, Error> {
        let mut removed = 0;
        for key in self.store.keys(ANALYSIS_KEY_PREFIX).await? {
            let Some(value) = self.store.get(&key).await? else {
                continue;
            };
            let failed = serde_json::from_value::<CacheEntry>(value)
                .map(|entry| entry.data.error)
                .unwrap_or(true);
            if failed && self.store.remove(&key).await? {
                removed += 1;
            }
        }
        tracing::debug!(removed, "cleared cached failures");
        Ok(removed)
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            tracing::warn!(error = %e, key, "failed to evict cache entry");
        }
    }
}
