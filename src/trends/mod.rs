//! Trending-search provider integration
//!
//! Wraps the SerpApi Google Trends engines behind a rate-limited HTTP
//! client. A failed region recovers to an empty result set; the deep
//! scoring mode reuses the same client for related-news context.

pub mod client;
pub mod error;

pub use client::TrendsClient;
pub use error::FetchError;
