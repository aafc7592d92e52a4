mod candidate;
mod category;
mod interaction;
mod query;
pub mod tmdb;
mod watchlist;
pub mod youtube;

pub use candidate::{normalize_title, Candidate, Platform, ScoredCandidate};
pub use category::{Category, CategoryProfile, RankingWeights};
pub use interaction::{InteractionEvent, InteractionStats};
pub use query::{
    Affinity, Query, DEFAULT_REGION, DEFAULT_RESULT_LIMIT, MAX_RESULT_LIMIT, MAX_SEARCH_TERM_CHARS,
};
pub use watchlist::WatchlistItem;
