// ============================================================================
// TMDB API Types
// ============================================================================

use serde::Deserialize;
use std::collections::HashMap;

use super::Platform;

/// Response from GET /search/movie and GET /search/tv
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

/// A single search hit. Movies carry `title`/`release_date`, series carry
/// `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl TmdbSearchResult {
    /// Year part of a `YYYY-MM-DD` date; TMDB sends an empty string when unknown
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// Response from GET /{movie|tv}/{id}?append_to_response=credits,watch/providers
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    pub id: u64,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub credits: Option<TmdbCredits>,
    /// Series list their creators here instead of a directing credit
    #[serde(default)]
    pub created_by: Vec<TmdbPerson>,
    #[serde(default, rename = "watch/providers")]
    pub watch_providers: Option<TmdbWatchProviders>,
}

impl TmdbDetails {
    pub fn director(&self) -> Option<String> {
        self.credits
            .as_ref()
            .and_then(|credits| credits.crew.iter().find(|member| member.job == "Director"))
            .map(|member| member.name.clone())
            .or_else(|| self.created_by.first().map(|person| person.name.clone()))
    }

    pub fn top_cast(&self, limit: usize) -> Vec<String> {
        self.credits
            .as_ref()
            .map(|credits| {
                credits
                    .cast
                    .iter()
                    .take(limit)
                    .map(|member| member.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Streaming platforms offering the title in `region`
    ///
    /// Subscription offers win; when there are none, the first three purchase
    /// offers are used. Unknown providers are skipped.
    pub fn platforms_in(&self, region: &str) -> Vec<Platform> {
        let Some(offers) = self
            .watch_providers
            .as_ref()
            .and_then(|providers| providers.results.get(region))
        else {
            return Vec::new();
        };

        let mut platforms: Vec<Platform> = offers
            .flatrate
            .iter()
            .filter_map(|offer| platform_for_provider(offer.provider_id))
            .collect();

        if platforms.is_empty() {
            platforms = offers
                .buy
                .iter()
                .take(3)
                .filter_map(|offer| platform_for_provider(offer.provider_id))
                .collect();
        }

        platforms.dedup();
        platforms
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbPerson>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbWatchProviders {
    /// Keyed by ISO 3166-1 country code
    #[serde(default)]
    pub results: HashMap<String, TmdbRegionOffers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbRegionOffers {
    #[serde(default)]
    pub flatrate: Vec<TmdbProviderOffer>,
    #[serde(default)]
    pub buy: Vec<TmdbProviderOffer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProviderOffer {
    pub provider_id: u32,
    #[serde(default)]
    pub provider_name: String,
}

/// Maps a TMDB watch-provider ID to a known platform
pub fn platform_for_provider(provider_id: u32) -> Option<Platform> {
    match provider_id {
        8 => Some(Platform::Netflix),
        9 | 119 => Some(Platform::PrimeVideo),
        337 => Some(Platform::DisneyPlus),
        15 => Some(Platform::Hulu),
        384 | 1899 => Some(Platform::Max),
        350 => Some(Platform::AppleTv),
        386 => Some(Platform::Peacock),
        _ => None,
    }
}

/// Maps a TMDB genre ID (movie or TV list) to its display name
pub fn genre_name(genre_id: u32) -> Option<&'static str> {
    let name = match genre_id {
        28 => "Action",
        12 => "Adventure",
        16 => "Animation",
        35 => "Comedy",
        80 => "Crime",
        99 => "Documentary",
        18 => "Drama",
        10751 => "Family",
        14 => "Fantasy",
        36 => "History",
        27 => "Horror",
        10402 => "Music",
        9648 => "Mystery",
        10749 => "Romance",
        878 => "Science Fiction",
        10770 => "TV Movie",
        53 => "Thriller",
        10752 => "War",
        37 => "Western",
        10759 => "Action & Adventure",
        10762 => "Kids",
        10763 => "News",
        10764 => "Reality",
        10765 => "Sci-Fi & Fantasy",
        10766 => "Soap",
        10767 => "Talk",
        10768 => "War & Politics",
        _ => return None,
    };
    Some(name)
}
