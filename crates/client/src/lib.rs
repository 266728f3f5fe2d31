//! Client code for privai.
//!
//! This crate provides the remote analyzer: the [`Analyzer`] seam, the
//! Perplexity implementation with its retry policy, and decoding of model
//! output into typed analyses.

pub mod analyzer;
pub mod decode;
pub mod error;
pub mod perplexity;

pub use analyzer::Analyzer;
pub use decode::decode_analysis;
pub use error::AnalyzeError;
pub use perplexity::{PerplexityClient, PerplexityConfig};
