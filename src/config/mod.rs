//! Configuration management for the trendscope pipeline
//!
//! This module handles loading and validating configuration from
//! environment variables and optional TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default region codes to aggregate
pub const DEFAULT_GEO_LIST: &[&str] = &["US", "GB", "FR", "IN", "JP", "AU"];

/// Default blacklist of substrings that mark typical false positives
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "fc",
    "football",
    "match",
    "movie",
    "record",
    "león",
    "music",
    "trailer",
    "horoscope",
    "festival",
    "concert",
    "wrestling",
    "series",
    "tournament",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Trends provider configuration
    pub trends: TrendsConfig,

    /// Scoring configuration
    pub scoring: ScoringConfig,

    /// Ranking thresholds
    pub ranking: RankingConfig,

    /// Artifact export configuration
    pub export: ExportConfig,

    /// Trigger server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trends provider (SerpApi) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// Provider API key
    pub api_key: String,

    /// Region codes to aggregate
    pub geo_list: Vec<String>,

    /// Time window in hours (168 = 7 days)
    pub window_hours: u32,

    /// Rate limit towards the provider (requests per second)
    pub rate_limit: u32,
}

/// Semantic scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Fast (query text, batched) or deep (article context, sequential)
    pub mode: ScoringMode,

    /// Lowercased substrings that exclude a query
    pub blacklist: Vec<String>,
}

/// Ranking thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Entries below this raw search volume are dropped
    pub min_volume: u64,

    /// Length of the published top list
    pub top_n: usize,
}

/// Artifact export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Local artifact path, overwritten wholesale each run
    pub output_path: PathBuf,

    /// Object-storage upload target; None disables the upload step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<R2Config>,
}

/// Cloudflare R2 (S3-compatible) upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct R2Config {
    /// S3-compatible endpoint URL
    pub endpoint: String,

    /// Access key ID
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,

    /// Target bucket name
    pub bucket: String,

    /// Base URL under which uploaded objects are publicly served
    pub public_url: String,
}

/// Trigger server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

/// Scoring strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Score the query text alone, one batched model invocation
    Fast,
    /// Score related-article context, sequential and rate-limited
    Deep,
}

impl FromStr for ScoringMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "deep" => Ok(Self::Deep),
            other => anyhow::bail!("unknown scoring mode: {other} (expected fast or deep)"),
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Deep => write!(f, "deep"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERPAPI_KEY").unwrap_or_default();

        let geo_list = std::env::var("TRENDSCOPE_GEO_LIST")
            .map(|v| parse_csv(&v))
            .unwrap_or_else(|_| DEFAULT_GEO_LIST.iter().map(|s| s.to_string()).collect());

        let window_hours = std::env::var("TRENDSCOPE_WINDOW_HOURS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(168);

        let rate_limit = std::env::var("TRENDSCOPE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);

        let mode = match std::env::var("TRENDSCOPE_SCORING_MODE") {
            Ok(v) => v.parse::<ScoringMode>()?,
            Err(_) => ScoringMode::Fast,
        };

        let blacklist = std::env::var("TRENDSCOPE_BLACKLIST")
            .map(|v| parse_csv(&v.to_lowercase()))
            .unwrap_or_else(|_| DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect());

        let min_volume = std::env::var("TRENDSCOPE_MIN_VOLUME")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15_000);

        let top_n = std::env::var("TRENDSCOPE_TOP_N")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let output_path = std::env::var("TRENDSCOPE_OUTPUT_PATH")
            .unwrap_or_else(|_| String::from("ai_trends_7days.json"))
            .into();

        let upload = Self::r2_from_env()?;

        let port = std::env::var("TRENDSCOPE_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        let level = std::env::var("TRENDSCOPE_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let format = std::env::var("TRENDSCOPE_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            trends: TrendsConfig {
                api_key,
                geo_list,
                window_hours,
                rate_limit,
            },
            scoring: ScoringConfig { mode, blacklist },
            ranking: RankingConfig { min_volume, top_n },
            export: ExportConfig {
                output_path,
                upload,
            },
            server: ServerConfig { port },
            logging: LoggingConfig { level, format },
        })
    }

    /// Read the R2 variable set; all five enable upload, a partial set is an error
    fn r2_from_env() -> Result<Option<R2Config>> {
        let vars = [
            "R2_ENDPOINT",
            "R2_ACCESS_KEY_ID",
            "R2_SECRET_ACCESS_KEY",
            "R2_BUCKET",
            "R2_PUBLIC_URL",
        ];
        let values: Vec<Option<String>> = vars.iter().map(|v| std::env::var(v).ok()).collect();
        let set = values.iter().filter(|v| v.is_some()).count();

        if set == 0 {
            return Ok(None);
        }
        if set < vars.len() {
            let missing: Vec<&str> = vars
                .iter()
                .zip(&values)
                .filter(|(_, v)| v.is_none())
                .map(|(name, _)| *name)
                .collect();
            anyhow::bail!("incomplete R2 configuration, missing: {}", missing.join(", "));
        }

        let mut values = values.into_iter().flatten();
        Ok(Some(R2Config {
            endpoint: values.next().unwrap_or_default(),
            access_key_id: values.next().unwrap_or_default(),
            secret_access_key: values.next().unwrap_or_default(),
            bucket: values.next().unwrap_or_default(),
            public_url: values.next().unwrap_or_default(),
        }))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// A missing API key is fatal at startup, before any run attempt.
    pub fn validate(&self) -> Result<()> {
        if self.trends.api_key.trim().is_empty() {
            anyhow::bail!("SERPAPI_KEY is required");
        }

        if self.trends.geo_list.is_empty() {
            anyhow::bail!("geo_list must not be empty");
        }

        if self.trends.window_hours == 0 {
            anyhow::bail!("window_hours must be greater than 0");
        }

        if self.trends.rate_limit == 0 {
            anyhow::bail!("rate_limit must be greater than 0");
        }

        if self.ranking.top_n == 0 {
            anyhow::bail!("top_n must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trends: TrendsConfig {
                api_key: String::new(),
                geo_list: DEFAULT_GEO_LIST.iter().map(|s| s.to_string()).collect(),
                window_hours: 168,
                rate_limit: 2,
            },
            scoring: ScoringConfig {
                mode: ScoringMode::Fast,
                blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            },
            ranking: RankingConfig {
                min_volume: 15_000,
                top_n: 10,
            },
            export: ExportConfig {
                output_path: PathBuf::from("ai_trends_7days.json"),
                upload: None,
            },
            server: ServerConfig { port: 8080 },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
