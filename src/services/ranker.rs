use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::error::ValidationError;
use crate::models::{normalize_title, Affinity, Candidate, Category, Query, RankingWeights, ScoredCandidate};

/// Releases this many years away from now get no recency credit
const RECENCY_HORIZON_YEARS: f64 = 20.0;

/// Sub-score used when a candidate has no value for a signal
const NEUTRAL_SCORE: f64 = 0.5;

/// Weighted-sum relevance ranking
///
/// Each candidate gets five sub-scores in [0, 1] (text relevance, popularity,
/// rating, recency, affinity) combined with per-category weights.
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: HashMap<Category, RankingWeights>,
}

impl Ranker {
    /// Ranker using the built-in category weights
    pub fn new() -> Self {
        let weights = Category::ALL
            .iter()
            .map(|category| (*category, category.profile().weights))
            .collect();
        Self { weights }
    }

    /// Ranker with per-category weight overrides applied over the built-in ones
    ///
    /// Fails if any resulting weight set is invalid.
    pub fn with_overrides(
        overrides: HashMap<Category, RankingWeights>,
    ) -> Result<Self, ValidationError> {
        let mut ranker = Self::new();
        ranker.weights.extend(overrides);

        for category in Category::ALL {
            ranker
                .weights_for(category)
                .validate()
                .map_err(|e| ValidationError::CategoryWeights {
                    category,
                    source: Box::new(e),
                })?;
        }
        Ok(ranker)
    }

    pub fn weights_for(&self, category: Category) -> RankingWeights {
        self.weights
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.profile().weights)
    }

    /// Scores and orders `candidates` for `query`
    ///
    /// Sorted by score descending, then popularity descending, then ID
    /// ascending, so equal inputs always produce the same order.
    pub fn rank(&self, candidates: Vec<Candidate>, query: &Query, current_year: i32) -> Vec<ScoredCandidate> {
        let weights = self.weights_for(query.category());
        let query_tokens = tokenize(query.search_term());
        let max_popularity = candidates
            .iter()
            .map(|candidate| candidate.popularity_score)
            .fold(0.0_f64, f64::max);

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|candidate| {
                let score = weights.text_relevance * score_text_relevance(&query_tokens, &candidate)
                    + weights.popularity * score_popularity(candidate.popularity_score, max_popularity)
                    + weights.rating * score_rating(candidate.rating_value)
                    + weights.recency * score_recency(candidate.release_year, current_year)
                    + weights.affinity * score_affinity(query.affinity(), &candidate);
                ScoredCandidate { candidate, score }
            })
            .collect();

        scored.sort_by(compare_ranked);
        scored
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new()
    }
}

/// Taste signal taken from the title the user searched for
///
/// The searched title is the most popular candidate whose title holds every
/// query token and which carries genres or people to learn from (lowest ID on
/// ties). Its genres, cast and director then pull related titles up the list.
pub fn seed_affinity(query: &Query, candidates: &[Candidate]) -> Option<Affinity> {
    let query_tokens = tokenize(query.search_term());

    candidates
        .iter()
        .filter(|candidate| token_overlap(&query_tokens, &candidate.title) >= 1.0)
        .filter(|candidate| {
            candidate.director_name.is_some()
                || !candidate.cast_names.is_empty()
                || !candidate.genre_tags.is_empty()
        })
        .min_by(|a, b| {
            b.popularity_score
                .total_cmp(&a.popularity_score)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(Affinity::from_candidate)
}

fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| {
            b.candidate
                .popularity_score
                .total_cmp(&a.candidate.popularity_score)
        })
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

fn tokenize(text: &str) -> BTreeSet<String> {
    normalize_title(text)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Share of query tokens found in `text`
fn token_overlap(query_tokens: &BTreeSet<String>, text: &str) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let text_tokens = tokenize(text);
    let hits = query_tokens
        .iter()
        .filter(|token| text_tokens.contains(*token))
        .count();
    hits as f64 / query_tokens.len() as f64
}

/// Title match, or half credit for a description match
fn score_text_relevance(query_tokens: &BTreeSet<String>, candidate: &Candidate) -> f64 {
    let title = token_overlap(query_tokens, &candidate.title);
    let description = candidate
        .description
        .as_deref()
        .map(|text| token_overlap(query_tokens, text))
        .unwrap_or(0.0);
    title.max(0.5 * description)
}

/// Log-damped share of the batch maximum
///
/// View counts reach the billions while TMDB popularity sits in the hundreds;
/// the log keeps one huge value from flattening everything else to zero.
fn score_popularity(popularity: f64, max_popularity: f64) -> f64 {
    if max_popularity <= 0.0 {
        return 0.0;
    }
    (popularity.max(0.0).ln_1p() / max_popularity.ln_1p()).clamp(0.0, 1.0)
}

fn score_rating(rating: Option<f64>) -> f64 {
    rating
        .map(|value| (value / 10.0).clamp(0.0, 1.0))
        .unwrap_or(NEUTRAL_SCORE)
}

fn score_recency(release_year: Option<i32>, current_year: i32) -> f64 {
    match release_year {
        Some(year) => {
            let age = (current_year - year).abs() as f64;
            1.0 - (age / RECENCY_HORIZON_YEARS).min(1.0)
        }
        None => NEUTRAL_SCORE,
    }
}

/// Mean of the overlap ratios for each non-empty part of the affinity
fn score_affinity(affinity: &Affinity, candidate: &Candidate) -> f64 {
    let mut components = Vec::with_capacity(3);

    if !affinity.genres.is_empty() {
        let shared = candidate
            .genre_tags
            .iter()
            .filter(|genre| affinity.genres.contains(&genre.to_lowercase()))
            .count();
        components.push(shared as f64 / affinity.genres.len() as f64);
    }

    if !affinity.cast_names.is_empty() {
        let shared = candidate
            .cast_names
            .iter()
            .filter(|name| affinity.cast_names.contains(&name.to_lowercase()))
            .count();
        components.push(shared as f64 / affinity.cast_names.len() as f64);
    }

    if !affinity.directors.is_empty() {
        let matched = candidate
            .director_name
            .as_ref()
            .is_some_and(|director| affinity.directors.contains(&director.to_lowercase()));
        components.push(if matched { 1.0 } else { 0.0 });
    }

    if components.is_empty() {
        return 0.0;
    }
    (components.iter().sum::<f64>() / components.len() as f64).min(1.0)
}
