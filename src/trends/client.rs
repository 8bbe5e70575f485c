//! Rate-limited SerpApi client for Google Trends engines
//!
//! Two engines are used:
//! - `google_trends_trending_now` for per-region trending queries
//! - `google_trends_news` for related-article context (deep mode only)
//!
//! Per-region fetch failures are recovered locally: the region
//! contributes zero trends and the run continues. No retry is performed.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::config::TrendsConfig;
use crate::models::RawTrend;

use super::error::FetchError;

/// Default provider endpoint
const SERPAPI_BASE_URL: &str = "https://serpapi.com";

/// Raw trending-now response payload
#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    trending_searches: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    #[serde(default)]
    query: String,

    /// May be absent or null in the provider payload
    #[serde(default)]
    search_volume: Option<u64>,

    #[serde(default)]
    serpapi_news_link: Option<String>,
}

/// Raw related-news response payload
#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news_results: Vec<NewsEntry>,
}

#[derive(Debug, Deserialize)]
struct NewsEntry {
    #[serde(default)]
    title: String,

    #[serde(default)]
    snippet: String,
}

/// Trends provider client with rate limiting
pub struct TrendsClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Provider API key
    api_key: String,

    /// Time window in hours sent with every trending-now request
    window_hours: u32,

    /// Rate limiter shared by all provider calls
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Base URL, overridable for testing with mock servers
    base_url: String,
}

impl TrendsClient {
    /// Create a new client from the trends configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &TrendsConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .build()?;

        let rate = NonZeroU32::new(config.rate_limit).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            window_hours: config.window_hours,
            rate_limiter,
            base_url: SERPAPI_BASE_URL.to_string(),
        })
    }

    /// Create a client pointed at a custom base URL for testing
    pub fn with_base_url(config: &TrendsConfig, base_url: &str) -> Result<Self, FetchError> {
        let mut client = Self::new(config)?;
        client.base_url = base_url.trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Fetch trending searches for one region
    ///
    /// Never fails: any provider error is logged and the region
    /// contributes an empty result set.
    pub async fn fetch_trending(&self, geo: &str) -> Vec<RawTrend> {
        match self.fetch_trending_inner(geo).await {
            Ok(trends) => {
                tracing::info!(region = %geo, count = trends.len(), "Fetched trending searches");
                trends
            }
            Err(e) => {
                tracing::warn!(region = %geo, error = %e, "Trending fetch failed, skipping region");
                Vec::new()
            }
        }
    }

    async fn fetch_trending_inner(&self, geo: &str) -> Result<Vec<RawTrend>, FetchError> {
        self.rate_limiter.until_ready().await;

        let hours = self.window_hours.to_string();
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google_trends_trending_now"),
                ("geo", geo),
                ("hours", hours.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload: TrendingResponse = response.json().await?;

        let trends = payload
            .trending_searches
            .into_iter()
            .filter(|entry| !entry.query.trim().is_empty())
            .map(|entry| RawTrend {
                query: entry.query,
                geo: geo.to_string(),
                search_volume: entry.search_volume.unwrap_or(0),
                news_link: entry.serpapi_news_link.unwrap_or_default(),
            })
            .collect();

        Ok(trends)
    }

    /// Fetch concatenated titles and snippets of related news articles
    ///
    /// Used by the deep scoring mode. Returns an empty string when the
    /// link carries no page token or when the provider call fails, so
    /// the caller falls back to scoring the bare query text.
    pub async fn fetch_news_context(&self, news_link: &str) -> String {
        let Some(token) = extract_page_token(news_link) else {
            return String::new();
        };

        match self.fetch_news_inner(&token).await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "Related-news fetch failed, falling back to query text");
                String::new()
            }
        }
    }

    async fn fetch_news_inner(&self, page_token: &str) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google_trends_news"),
                ("page_token", page_token),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload: NewsResponse = response.json().await?;

        let text = payload
            .news_results
            .iter()
            .map(|article| format!("{} {}", article.title, article.snippet))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(text)
    }
}

/// Extract the `page_token` query parameter from a follow-up link
fn extract_page_token(news_link: &str) -> Option<String> {
    let parsed = url::Url::parse(news_link).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
}
