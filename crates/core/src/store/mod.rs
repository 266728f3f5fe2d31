//! Persistent key-value storage.
//!
//! Everything the service persists lives in one flat namespace of string
//! keys mapped to JSON values: cached analyses under `analysis_<url>` and the
//! API credential under its own key. Components receive the store as an
//! injected [`KvStore`] rather than reaching for a global.
//!
//! - [`SqliteStore`]: SQLite file in WAL mode with versioned migrations
//! - [`MemoryStore`]: process-local map for tests and ephemeral runs

pub mod memory;
pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::Value;

use crate::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Flat string-key to JSON-value storage.
///
/// Writes are atomic per key; there are no multi-key transactions.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, Error>;

    /// Insert or overwrite the value stored under `key`.
    async fn put(&self, key: &str, value: Value) -> Result<(), Error>;

    /// Remove `key`, returning whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, Error>;

    /// List keys starting with `prefix`, in ascending order.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, Error>;

    /// Remove every key starting with `prefix`, returning how many were removed.
    async fn clear_prefix(&self, prefix: &str) -> Result<u64, Error>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Store whose every operation fails as if its connection were gone.
    pub struct FailingStore;

    fn closed() -> Error {
        Error::Database(tokio_rusqlite::Error::ConnectionClosed)
    }

    #[async_trait]
    impl KvStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, Error> {
            Err(closed())
        }

        async fn put(&self, _key: &str, _value: Value) -> Result<(), Error> {
            Err(closed())
        }

        async fn remove(&self, _key: &str) -> Result<bool, Error> {
            Err(closed())
        }

        async fn keys(&self, _prefix: &str) -> Result<Vec<String>, Error> {
            Err(closed())
        }

        async fn clear_prefix(&self, _prefix: &str) -> Result<u64, Error> {
            Err(closed())
        }
    }
}
