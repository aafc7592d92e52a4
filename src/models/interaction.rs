use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Category;

/// A search or click recorded for later analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub session_id: String,
    pub category: Category,
    pub search_term: String,
    pub region: String,
    /// Candidate IDs in the order they were shown
    pub shown_candidate_ids: Vec<String>,
    pub clicked_candidate_id: Option<String>,
    pub clicked_position: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn is_click(&self) -> bool {
        self.clicked_candidate_id.is_some()
    }
}

/// Aggregate view over all recorded interactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStats {
    pub total_interactions: i64,
    pub total_clicks: i64,
    /// Percentage rounded to two decimals
    pub click_through_rate: f64,
    pub category_breakdown: BTreeMap<String, i64>,
}

impl InteractionStats {
    pub fn new(
        total_interactions: i64,
        total_clicks: i64,
        category_breakdown: BTreeMap<String, i64>,
    ) -> Self {
        let click_through_rate = if total_interactions > 0 {
            (total_clicks as f64 / total_interactions as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_interactions,
            total_clicks,
            click_through_rate,
            category_breakdown,
        }
    }
}
