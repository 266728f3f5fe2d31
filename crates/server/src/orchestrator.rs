//! Analysis orchestration.
//!
//! Decides whether a URL needs analyzing, consults the cache, runs the
//! remote analyzer and keeps the badge in step. Automatic analyses of the
//! same normalized URL are single-flight: concurrent callers share one
//! spawned task, which is forgotten once it completes. The task runs to
//! completion even if every caller stops waiting for it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use privai_client::Analyzer;
use privai_core::url::{normalize, should_skip};
use privai_core::{AnalysisCache, AnalysisResult, Credentials};

use crate::badge::Badge;

type InFlight = Shared<BoxFuture<'static, Analysis>>;

/// Outcome of an analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// URL is not eligible for analysis.
    Skipped,
    /// Served from the cache without a remote call.
    Cached { result: AnalysisResult },
    /// Freshly analyzed and cached.
    Fresh { result: AnalysisResult },
    /// The analyzer failed; `result` is the failure record that was cached.
    Failed { result: AnalysisResult, error: String },
}

impl Analysis {
    pub fn outcome(&self) -> &'static str {
        match self {
            Analysis::Skipped => "skipped",
            Analysis::Cached { .. } => "cached",
            Analysis::Fresh { .. } => "fresh",
            Analysis::Failed { .. } => "failed",
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Analysis::Skipped => None,
            Analysis::Cached { result } | Analysis::Fresh { result } | Analysis::Failed { result, .. } => Some(result),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Analysis::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

struct Inner {
    cache: AnalysisCache,
    credentials: Credentials,
    analyzer: Arc<dyn Analyzer>,
    badge: Badge,
    skip_hosts: Vec<String>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        cache: AnalysisCache, credentials: Credentials, analyzer: Arc<dyn Analyzer>, badge: Badge,
        skip_hosts: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                credentials,
                analyzer,
                badge,
                skip_hosts,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.inner.cache
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn badge(&self) -> &Badge {
        &self.inner.badge
    }

    pub fn is_eligible(&self, url: &str) -> bool {
        !should_skip(url, &self.inner.skip_hosts)
    }

    /// Make sure `url` has an analysis, serving it from the cache when possible.
    pub async fn ensure_analyzed(&self, url: &str) -> Analysis {
        if !self.is_eligible(url) {
            tracing::debug!(url, "skipping ineligible URL");
            self.inner.badge.clear();
            return Analysis::Skipped;
        }

        if let Some(result) = self.inner.cache.get(url).await {
            tracing::debug!(url, risk = %result.risk_level, "cache hit");
            self.inner.badge.show_risk(result.risk_level);
            return Analysis::Cached { result };
        }

        let key = normalize(url);
        let shared = {
            let mut in_flight = self.in_flight();
            if let Some(existing) = in_flight.get(&key) {
                tracing::debug!(url = %key, "joining in-flight analysis");
                existing.clone()
            } else {
                let this = self.clone();
                let url = url.to_string();
                let done_key = key.clone();
                let task = tokio::spawn(async move {
                    let outcome = this.analyze_and_store(&url).await;
                    this.in_flight().remove(&done_key);
                    outcome
                });
                let fut = async move {
                    task.await.unwrap_or_else(|e| {
                        tracing::error!(error = %e, "analysis task aborted");
                        Analysis::Failed { result: AnalysisResult::failed(), error: format!("analysis task aborted: {e}") }
                    })
                }
                .boxed()
                .shared();
                in_flight.insert(key, fut.clone());
                fut
            }
        };

        shared.await
    }

    /// Analyze `url` now, ignoring the cache and any in-flight analysis.
    pub async fn analyze_now(&self, url: &str) -> Analysis {
        tracing::info!(url, "forced analysis requested");
        self.analyze_and_store(url).await
    }

    async fn analyze_and_store(&self, url: &str) -> Analysis {
        let inner = &self.inner;
        inner.badge.show_pending();

        let api_key = inner.credentials.api_key().await.unwrap_or_default();
        match inner.analyzer.analyze(url, &api_key).await {
            Ok(result) => {
                inner.cache.put(url, &result).await;
                inner.badge.show_risk(result.risk_level);
                Analysis::Fresh { result }
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "analysis failed, caching failure");
                let result = AnalysisResult::failed();
                inner.cache.put(url, &result).await;
                inner.badge.show_error();
                Analysis::Failed { result, error: e.to_string() }
            }
        }
    }

    fn in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<String, InFlight>> {
        self.inner.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}
