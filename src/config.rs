use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{Category, RankingWeights};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// YouTube Data API key
    pub youtube_api_key: String,

    /// YouTube Data API base URL
    #[serde(default = "default_youtube_api_url")]
    pub youtube_api_url: String,

    /// PostgreSQL connection URL for the interaction store. In-memory store when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL for the result cache. In-process cache when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Result cache time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum entries kept by the in-process cache
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Number of ranked results stored per cache entry
    #[serde(default = "default_cache_superset_size")]
    pub cache_superset_size: usize,

    /// Per-provider call timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// `maxResults` sent to the YouTube search endpoint
    #[serde(default = "default_youtube_max_results")]
    pub youtube_max_results: u32,

    /// Number of TMDB search hits enriched with credits and watch providers
    #[serde(default = "default_tmdb_detail_lookups")]
    pub tmdb_detail_lookups: usize,

    /// Optional JSON file with per-category ranking weight overrides
    #[serde(default)]
    pub ranking_weights_path: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_youtube_api_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    180
}

fn default_cache_max_entries() -> usize {
    1000
}

fn default_cache_superset_size() -> usize {
    50
}

fn default_provider_timeout_secs() -> u64 {
    5
}

fn default_youtube_max_results() -> u32 {
    25
}

fn default_tmdb_detail_lookups() -> usize {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Reads the per-category weight overrides, if a file is configured
    pub fn ranking_overrides(&self) -> anyhow::Result<HashMap<Category, RankingWeights>> {
        let Some(path) = &self.ranking_weights_path else {
            return Ok(HashMap::new());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read ranking weights {}: {}", path.display(), e)
        })?;
        parse_ranking_overrides(&raw)
    }
}

/// Parses `{"viral_clip": {"text_relevance": 0.3, ...}, ...}`
pub fn parse_ranking_overrides(raw: &str) -> anyhow::Result<HashMap<Category, RankingWeights>> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("Invalid ranking weights: {}", e))
}
