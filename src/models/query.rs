use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Candidate, Category, WatchlistItem};
use crate::error::ValidationError;

pub const MAX_SEARCH_TERM_CHARS: usize = 200;
pub const MAX_RESULT_LIMIT: usize = 50;
pub const DEFAULT_RESULT_LIMIT: usize = 20;
pub const DEFAULT_REGION: &str = "US";

/// A validated recommendation query
///
/// Fields are only reachable through accessors so a query cannot change after
/// it has been validated and keyed.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    category: Category,
    search_term: String,
    region: String,
    result_limit: usize,
    affinity: Affinity,
}

impl Query {
    /// Validates and builds a query
    ///
    /// The search term is trimmed and must be non-empty and at most 200 characters.
    /// The region must be a two-letter country code and is upper-cased.
    /// The limit must be between 1 and 50.
    pub fn new(
        category: Category,
        search_term: &str,
        region: &str,
        result_limit: usize,
    ) -> Result<Self, ValidationError> {
        let search_term = search_term.trim();
        if search_term.is_empty() {
            return Err(ValidationError::EmptySearchTerm);
        }
        if search_term.chars().count() > MAX_SEARCH_TERM_CHARS {
            return Err(ValidationError::SearchTermTooLong {
                max: MAX_SEARCH_TERM_CHARS,
            });
        }

        let region = region.trim();
        if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidRegion(region.to_string()));
        }

        if result_limit == 0 || result_limit > MAX_RESULT_LIMIT {
            return Err(ValidationError::LimitOutOfRange {
                got: result_limit,
                max: MAX_RESULT_LIMIT,
            });
        }

        Ok(Self {
            category,
            search_term: search_term.to_string(),
            region: region.to_ascii_uppercase(),
            result_limit,
            affinity: Affinity::default(),
        })
    }

    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    pub fn affinity(&self) -> &Affinity {
        &self.affinity
    }
}

/// Taste signal from earlier in the session: genres, people and directors the
/// user has shown interest in. Empty when nothing is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affinity {
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub cast_names: BTreeSet<String>,
    #[serde(default)]
    pub directors: BTreeSet<String>,
}

impl Affinity {
    /// Unions the genres, cast and directors of saved watchlist items
    pub fn from_items(items: &[WatchlistItem]) -> Self {
        let mut affinity = Affinity::default();
        for item in items {
            affinity.absorb(&item.candidate);
        }
        affinity
    }

    /// Genres, cast and director of a single title
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let mut affinity = Affinity::default();
        affinity.absorb(candidate);
        affinity
    }

    fn absorb(&mut self, candidate: &Candidate) {
        self.genres
            .extend(candidate.genre_tags.iter().map(|g| g.to_lowercase()));
        self.cast_names
            .extend(candidate.cast_names.iter().map(|c| c.to_lowercase()));
        if let Some(director) = &candidate.director_name {
            self.directors.insert(director.to_lowercase());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.cast_names.is_empty() && self.directors.is_empty()
    }

    /// Stable textual digest, used to keep differently personalised rankings apart in the cache
    pub fn fingerprint(&self) -> String {
        let join = |set: &BTreeSet<String>| {
            let mut values: Vec<String> = set.iter().map(|v| v.to_lowercase()).collect();
            values.sort();
            values.dedup();
            values.join(",")
        };
        format!(
            "g={};c={};d={}",
            join(&self.genres),
            join(&self.cast_names),
            join(&self.directors)
        )
    }
}
