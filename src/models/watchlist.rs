use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Candidate;

/// A candidate saved by the user, keyed by session and candidate ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub added_at: DateTime<Utc>,
}

impl WatchlistItem {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}
