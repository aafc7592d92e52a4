use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Where a title can be watched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Netflix,
    PrimeVideo,
    DisneyPlus,
    Hulu,
    Max,
    AppleTv,
    Peacock,
    Youtube,
    /// Catalog entry with no known streaming offer in the requested region
    Tmdb,
}

impl Platform {
    /// Streaming platforms in the order they are preferred as a card's primary link
    pub const STREAMING_PRIORITY: [Platform; 7] = [
        Platform::Netflix,
        Platform::DisneyPlus,
        Platform::PrimeVideo,
        Platform::Hulu,
        Platform::Max,
        Platform::AppleTv,
        Platform::Peacock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Netflix => "netflix",
            Platform::PrimeVideo => "prime_video",
            Platform::DisneyPlus => "disney_plus",
            Platform::Hulu => "hulu",
            Platform::Max => "max",
            Platform::AppleTv => "apple_tv",
            Platform::Peacock => "peacock",
            Platform::Youtube => "youtube",
            Platform::Tmdb => "tmdb",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized content item returned by a provider, before ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Provider-scoped identifier, e.g. `tmdb:movie:27205` or `youtube:dQw4w9WgXcQ`
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub source_platform: Platform,
    pub available_platforms: BTreeSet<Platform>,
    pub release_year: Option<i32>,
    /// 0-10 scale
    pub rating_value: Option<f64>,
    #[serde(default)]
    pub genre_tags: BTreeSet<String>,
    #[serde(default)]
    pub cast_names: BTreeSet<String>,
    pub director_name: Option<String>,
    pub popularity_score: f64,
    pub description: Option<String>,
    pub watch_url: String,
}

impl Candidate {
    /// Creates a candidate available only on its source platform
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source_platform: Platform,
        watch_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail_url: String::new(),
            source_platform,
            available_platforms: BTreeSet::from([source_platform]),
            release_year: None,
            rating_value: None,
            genre_tags: BTreeSet::new(),
            cast_names: BTreeSet::new(),
            director_name: None,
            popularity_score: 0.0,
            description: None,
            watch_url: watch_url.into(),
        }
    }

    /// Lower-cased alphanumeric tokens of the title joined by single spaces
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A candidate with the relevance score assigned by the ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f64,
}
