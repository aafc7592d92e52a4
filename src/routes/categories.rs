use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::{Category, RankingWeights};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Category,
    pub label: &'static str,
    pub description: &'static str,
    /// Weights in effect, including configured overrides
    pub weights: RankingWeights,
}

/// Lists the searchable categories
pub async fn list(State(state): State<AppState>) -> Json<Vec<CategoryResponse>> {
    let categories = Category::ALL
        .iter()
        .map(|category| {
            let profile = category.profile();
            CategoryResponse {
                id: *category,
                label: profile.label,
                description: profile.description,
                weights: state.aggregator.ranker().weights_for(*category),
            }
        })
        .collect();

    Json(categories)
}
