//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRIVAI_*)
//! 2. TOML config file (if PRIVAI_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRIVAI_*)
/// 2. TOML config file (if PRIVAI_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Perplexity API key used when none has been stored by the user.
    ///
    /// Set via PRIVAI_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completions endpoint.
    ///
    /// Set via PRIVAI_API_URL environment variable.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name sent with each request.
    ///
    /// Set via PRIVAI_MODEL environment variable.
    #[serde(default = "default_model")]
    pub model: String,

    /// Path to SQLite store database.
    ///
    /// Set via PRIVAI_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PRIVAI_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PRIVAI_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How long a cached analysis stays valid, in seconds.
    ///
    /// Set via PRIVAI_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Additional attempts after a failed analysis request.
    ///
    /// Set via PRIVAI_MAX_RETRIES environment variable.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds.
    ///
    /// Set via PRIVAI_RETRY_DELAY_MS environment variable.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How long the error badge stays up before resetting, in milliseconds.
    ///
    /// Set via PRIVAI_ERROR_RESET_MS environment variable.
    #[serde(default = "default_error_reset_ms")]
    pub error_reset_ms: u64,

    /// Hosts never analyzed (the companion site by default).
    ///
    /// Set via PRIVAI_SKIP_HOSTS environment variable (array syntax,
    /// e.g. `["a.example","b.example"]`).
    #[serde(default = "default_skip_hosts")]
    pub skip_hosts: Vec<String>,
}

fn default_api_url() -> String {
    "https://api.perplexity.ai/chat/completions".into()
}

fn default_model() -> String {
    "sonar".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./privai-cache.sqlite")
}

fn default_user_agent() -> String {
    "privai/0.1".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_cache_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_error_reset_ms() -> u64 {
    5_000
}

fn default_skip_hosts() -> Vec<String> {
    vec!["privacy-ai.netlify.app".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            error_reset_ms: default_error_reset_ms(),
            skip_hosts: default_skip_hosts(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn error_reset(&self) -> Duration {
        Duration::from_millis(self.error_reset_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRIVAI_`
    /// 2. TOML file from `PRIVAI_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRIVAI_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRIVAI_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
