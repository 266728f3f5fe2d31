//! Tab lifecycle events.
//!
//! The router remembers the last URL seen for each tab and which tab is
//! active, and turns page loads and tab switches into orchestrator calls.
//! It never fails: downstream problems surface only through the returned
//! [`Analysis`] and the badge.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::orchestrator::{Analysis, Orchestrator};

/// Page load status that triggers analysis.
pub const STATUS_COMPLETE: &str = "complete";

pub type TabId = u64;

#[derive(Default)]
struct Tabs {
    urls: HashMap<TabId, String>,
    active: Option<TabId>,
}

pub struct TabRouter {
    orchestrator: Orchestrator,
    tabs: Mutex<Tabs>,
}

impl TabRouter {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator, tabs: Mutex::new(Tabs::default()) }
    }

    /// A tab changed. Only completed loads of a known URL are analyzed.
    pub async fn on_updated(&self, tab_id: TabId, status: &str, url: Option<&str>) -> Option<Analysis> {
        let url = self.remember(tab_id, url)?;

        if status != STATUS_COMPLETE {
            tracing::trace!(tab_id, status, "ignoring incomplete load");
            return None;
        }

        if !self.orchestrator.is_eligible(&url) {
            tracing::debug!(tab_id, url = %url, "skipping analysis for URL");
            return None;
        }

        Some(self.orchestrator.ensure_analyzed(&url).await)
    }

    /// The user switched to `tab_id`.
    pub async fn on_activated(&self, tab_id: TabId, url: Option<&str>) -> Analysis {
        let url = self.remember(tab_id, url);
        self.lock().active = Some(tab_id);

        match url {
            Some(url) => self.orchestrator.ensure_analyzed(&url).await,
            None => {
                self.orchestrator.badge().clear();
                Analysis::Skipped
            }
        }
    }

    /// Forget a closed tab, returning whether it was known.
    pub fn on_removed(&self, tab_id: TabId) -> bool {
        let mut tabs = self.lock();
        if tabs.active == Some(tab_id) {
            tabs.active = None;
        }
        tabs.urls.remove(&tab_id).is_some()
    }

    /// URL of the active tab, if any.
    pub fn current_url(&self) -> Option<String> {
        let tabs = self.lock();
        tabs.active.and_then(|id| tabs.urls.get(&id).cloned())
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Record a reported URL and return the best known URL for the tab.
    fn remember(&self, tab_id: TabId, url: Option<&str>) -> Option<String> {
        let mut tabs = self.lock();
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => {
                tabs.urls.insert(tab_id, url.to_string());
                Some(url.to_string())
            }
            None => tabs.urls.get(&tab_id).cloned(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tabs> {
        self.tabs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use privai_core::RiskLevel;

    use super::*;
    use crate::badge::BadgeState;
    use crate::orchestrator::testing::{FakeAnalyzer, orchestrator};

    fn router(analyzer: Arc<FakeAnalyzer>) -> TabRouter {
        TabRouter::new(orchestrator(analyzer).0)
    }

    #[tokio::test]
    async fn test_loading_status_is_ignored() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::Low));
        let router = router(analyzer.clone());

        assert!(router.on_updated(1, "loading", Some("https://example.com/")).await.is_none());
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn test_complete_load_triggers_analysis() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::High));
        let router = router(analyzer.clone());

        router.on_updated(1, "loading", Some("https://example.com/")).await;
        let outcome = router.on_updated(1, STATUS_COMPLETE, None).await;

        assert!(matches!(outcome, Some(Analysis::Fresh { .. })));
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn test_complete_load_of_internal_page_is_ignored() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::Low));
        let router = router(analyzer.clone());

        assert!(router.on_updated(1, STATUS_COMPLETE, Some("chrome://newtab/")).await.is_none());
        assert!(router.on_updated(2, STATUS_COMPLETE, None).await.is_none());
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn test_activation_uses_cache_and_tracks_current_url() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::Medium));
        let router = router(analyzer.clone());

        router.on_updated(7, STATUS_COMPLETE, Some("https://example.com/a")).await;
        assert_eq!(router.current_url(), None);

        let outcome = router.on_activated(7, None).await;
        assert!(matches!(outcome, Analysis::Cached { .. }));
        assert_eq!(router.current_url().as_deref(), Some("https://example.com/a"));
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn test_activation_of_unknown_tab_clears_badge() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::Low));
        let router = router(analyzer);
        router.orchestrator().badge().show_pending();

        assert_eq!(router.on_activated(3, None).await, Analysis::Skipped);
        assert_eq!(router.orchestrator().badge().state(), BadgeState::Idle);
    }

    #[tokio::test]
    async fn test_removed_tab_is_forgotten() {
        let analyzer = Arc::new(FakeAnalyzer::ok(RiskLevel::Low));
        let router = router(analyzer);

        router.on_activated(4, Some("https://example.com/")).await;
        assert!(router.on_removed(4));
        assert!(!router.on_removed(4));
        assert_eq!(router.current_url(), None);
    }
}
