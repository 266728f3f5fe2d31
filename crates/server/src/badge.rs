//! Risk indicator shown for the active page.
//!
//! The badge is a single shared state published over a [`watch`] channel.
//! Showing an error schedules a reset to idle; the reset is dropped when any
//! other state is shown before it fires.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use privai_core::RiskLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

const PENDING_COLOR: &str = "#8a2be2";
const ERROR_COLOR: &str = "#ff6b6b";

/// What the indicator currently displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeState {
    Idle,
    Pending,
    Risk(RiskLevel),
    Error,
}

impl BadgeState {
    pub fn name(&self) -> &'static str {
        match self {
            BadgeState::Idle => "idle",
            BadgeState::Pending => "pending",
            BadgeState::Risk(RiskLevel::Low) => "low",
            BadgeState::Risk(RiskLevel::Medium) => "medium",
            BadgeState::Risk(RiskLevel::High) => "high",
            BadgeState::Risk(RiskLevel::Unknown) => "unknown",
            BadgeState::Error => "error",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            BadgeState::Idle => "",
            BadgeState::Pending => "...",
            BadgeState::Risk(RiskLevel::Low) => "L",
            BadgeState::Risk(RiskLevel::Medium) => "M",
            BadgeState::Risk(RiskLevel::High) => "H",
            BadgeState::Risk(RiskLevel::Unknown) => "?",
            BadgeState::Error => "!",
        }
    }

    /// Background color, or `None` when the badge is blank.
    pub fn color(&self) -> Option<&'static str> {
        match self {
            BadgeState::Idle => None,
            BadgeState::Pending | BadgeState::Risk(RiskLevel::Unknown) => Some(PENDING_COLOR),
            BadgeState::Risk(RiskLevel::Low) => Some("#32CD32"),
            BadgeState::Risk(RiskLevel::Medium) => Some("#FFD700"),
            BadgeState::Risk(RiskLevel::High) => Some("#FF6B6B"),
            BadgeState::Error => Some(ERROR_COLOR),
        }
    }

    pub fn view(&self) -> BadgeView {
        BadgeView { state: self.name().to_string(), text: self.text().to_string(), color: self.color().map(String::from) }
    }
}

/// Rendered badge as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BadgeView {
    pub state: String,
    pub text: String,
    pub color: Option<String>,
}

struct Inner {
    tx: watch::Sender<BadgeState>,
    /// Bumped on every state change; a pending reset only applies to its own generation.
    generation: AtomicU64,
    error_reset: Duration,
}

/// Shared handle to the indicator.
#[derive(Clone)]
pub struct Badge {
    inner: Arc<Inner>,
}

impl Badge {
    pub fn new(error_reset: Duration) -> Self {
        let (tx, _rx) = watch::channel(BadgeState::Idle);
        Self { inner: Arc::new(Inner { tx, generation: AtomicU64::new(0), error_reset }) }
    }

    pub fn state(&self) -> BadgeState {
        *self.inner.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BadgeState> {
        self.inner.tx.subscribe()
    }

    pub fn clear(&self) {
        self.set(BadgeState::Idle);
    }

    pub fn show_pending(&self) {
        self.set(BadgeState::Pending);
    }

    pub fn show_risk(&self, level: RiskLevel) {
        self.set(BadgeState::Risk(level));
    }

    /// Show the error state and reset to idle after the configured delay.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show_error(&self) {
        let generation = self.set(BadgeState::Error);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::time::sleep(inner.error_reset).await;
            inner.tx.send_if_modified(|state| {
                if inner.generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *state = BadgeState::Idle;
                true
            });
        });
    }

    fn set(&self, state: BadgeState) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.tx.send_replace(state);
        tracing::debug!(state = state.name(), "badge updated");
        generation
    }
}
