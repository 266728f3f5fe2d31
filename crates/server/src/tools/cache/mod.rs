//! Cache-related MCP tools.
//!
//! This module provides tools for reading and clearing cached analyses.

pub mod clear;
pub mod get;

pub use clear::{ClearCacheParams, clear_all_cache_impl, clear_cache_impl};
pub use get::{GetAnalysisParams, get_analysis_impl};
