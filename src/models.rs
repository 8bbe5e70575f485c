// Core data structures for the trendscope pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A trending search query as returned by the provider for one region
///
/// Ephemeral: held in memory for a single run only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawTrend {
    /// The trending query text (dedup key across regions)
    pub query: String,

    /// Region code that produced this trend (e.g., "US")
    pub geo: String,

    /// Approximate search volume; 0 when absent from the source
    #[serde(default)]
    pub search_volume: u64,

    /// Opaque follow-up link to related news articles; may be empty
    #[serde(default)]
    pub news_link: String,
}

/// A trend with all derived scores, immutable once ranked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrend {
    pub query: String,
    pub geo: String,
    pub search_volume: u64,
    #[serde(default)]
    pub news_link: String,

    /// Cosine similarity against the topic reference, practically [0, 1]
    pub semantic_score: f32,

    /// Volume-tiered proxy for how established the trend is
    pub growth_score: f32,

    /// Min-max normalized volume over the run's candidate set
    pub volume_norm: f32,

    /// Weighted blend of volume, growth and semantic scores
    #[serde(rename = "score_final")]
    pub final_score: f32,
}

impl ScoredTrend {
    /// Build from a raw trend and its semantic score; ranking fills the rest
    pub fn from_raw(raw: RawTrend, semantic_score: f32) -> Self {
        Self {
            query: raw.query,
            geo: raw.geo,
            search_volume: raw.search_volume,
            news_link: raw.news_link,
            semantic_score,
            growth_score: 0.0,
            volume_norm: 0.0,
            final_score: 0.0,
        }
    }
}

/// Summary of one completed pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Regions that were queried
    pub regions: Vec<String>,

    /// Raw trends fetched across all regions
    pub raw_count: usize,

    /// Trends remaining after dedup and blacklist filtering
    pub unique_count: usize,

    /// Entries in the final ranked list
    pub ranked_count: usize,

    /// Where the JSON artifact was written
    pub artifact_path: PathBuf,

    /// Public URL when the upload step ran and succeeded
    pub public_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_trend_defaults() {
        let trend: RawTrend = serde_json::from_str(r#"{"query": "gpt-5", "geo": "US"}"#).unwrap();
        assert_eq!(trend.search_volume, 0);
        assert!(trend.news_link.is_empty());
    }

    #[test]
    fn test_scored_trend_wire_field_names() {
        let scored = ScoredTrend {
            query: "openai gpt-5".into(),
            geo: "US".into(),
            search_volume: 60_000,
            news_link: String::new(),
            semantic_score: 0.72,
            growth_score: 1.0,
            volume_norm: 1.0,
            final_score: 0.944,
        };

        let json = serde_json::to_value(&scored).unwrap();
        assert!(json.get("score_final").is_some());
        assert!(json.get("final_score").is_none());
        assert_eq!(json["geo"], "US");
        assert_eq!(json["search_volume"], 60_000);
    }

    #[test]
    fn test_scored_trend_roundtrip() {
        let scored = ScoredTrend {
            query: "mistral ai".into(),
            geo: "FR".into(),
            search_volume: 20_000,
            news_link: "https://serpapi.com/search?page_token=abc".into(),
            semantic_score: 0.61,
            growth_score: 0.8,
            volume_norm: 0.5,
            final_score: 0.612,
        };

        let json = serde_json::to_string(&scored).unwrap();
        let back: ScoredTrend = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scored);
    }
}
