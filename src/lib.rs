//! trendscope - AI trend detector
//!
//! Fetches region-scoped trending searches, scores them for semantic
//! relevance to artificial intelligence, and publishes a ranked top-N
//! list as a JSON artifact, optionally triggered over HTTP.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`trends`] - Trending-search provider client with rate limiting
//! - [`filter`] - Deduplication and blacklist filtering
//! - [`embedding`] - Vector embedding and semantic scoring
//! - [`ranking`] - Volume normalization, growth tiers and final ranking
//! - [`export`] - JSON artifact writing and object-storage upload
//! - [`pipeline`] - The end-to-end run orchestrator
//! - [`server`] - HTTP trigger server
//!
//! # Example
//!
//! ```no_run
//! use trendscope::config::Config;
//! use trendscope::trends::TrendsClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!     let client = TrendsClient::new(&config.trends)?;
//!     let trends = client.fetch_trending("US").await;
//!     println!("{} trends fetched", trends.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod server;
pub mod trends;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ScoringMode};
    pub use crate::embedding::{ScoreStrategy, SemanticScorer, TextEncoder};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{RawTrend, RunReport, ScoredTrend};
    pub use crate::pipeline::Pipeline;
    pub use crate::trends::TrendsClient;
}

// Direct re-exports for convenience
pub use models::{RawTrend, RunReport, ScoredTrend};
