//! API credential storage.
//!
//! The user's key is kept in the store under a single configuration key so
//! clearing the analysis cache never touches it. A key from [`AppConfig`]
//! acts as a fallback when nothing has been stored.
//!
//! [`AppConfig`]: crate::config::AppConfig

use std::sync::Arc;

use serde_json::Value;

use crate::Error;
use crate::store::KvStore;

/// Store key holding the API credential.
pub const API_KEY_STORE_KEY: &str = "perplexity_api_key";

const API_KEY_PREFIX: &str = "pplx-";
const API_KEY_MIN_LEN: usize = 40;

/// Resolves and persists the API credential.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KvStore>,
    fallback: Option<String>,
}

impl Credentials {
    pub fn new(store: Arc<dyn KvStore>, fallback: Option<String>) -> Self {
        let fallback = fallback.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Self { store, fallback }
    }

    /// The stored key if present, otherwise the configured fallback.
    pub async fn api_key(&self) -> Option<String> {
        match self.store.get(API_KEY_STORE_KEY).await {
            Ok(Some(Value::String(key))) if !key.trim().is_empty() => Some(key.trim().to_string()),
            Ok(_) => self.fallback.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored API key");
                self.fallback.clone()
            }
        }
    }

    pub async fn is_configured(&self) -> bool {
        self.api_key().await.is_some()
    }

    /// Validate and store a new key.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the key does not look like a
    /// Perplexity key, or a store error if it cannot be written.
    pub async fn set_api_key(&self, key: &str) -> Result<(), Error> {
        let key = validate_api_key(key)?;
        self.store.put(API_KEY_STORE_KEY, Value::String(key.to_string())).await?;
        tracing::info!("API key updated");
        Ok(())
    }
}

/// Check the key format, returning the trimmed key.
pub fn validate_api_key(key: &str) -> Result<&str, Error> {
    let key = key.trim();
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(Error::InvalidInput(format!("API key must start with \"{API_KEY_PREFIX}\"")));
    }
    if key.len() < API_KEY_MIN_LEN {
        return Err(Error::InvalidInput(format!("API key must be at least {API_KEY_MIN_LEN} characters")));
    }
    Ok(key)
}
