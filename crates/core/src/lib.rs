//! Core types and shared functionality for privai.
//!
//! This crate provides:
//! - Analysis payload types
//! - URL normalization and the skip-list
//! - Key-value store with SQLite and in-memory backends
//! - TTL analysis cache and credential storage
//! - Unified error types
//! - Configuration structures

pub mod analysis;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod store;
pub mod url;

pub use analysis::{AnalysisResult, RiskLevel};
pub use cache::{AnalysisCache, CacheEntry};
pub use config::{AppConfig, ConfigError};
pub use credentials::Credentials;
pub use error::Error;
pub use store::{KvStore, MemoryStore, SqliteStore};
