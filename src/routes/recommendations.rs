use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{Affinity, Category, Query, ScoredCandidate, DEFAULT_REGION, DEFAULT_RESULT_LIMIT},
};

use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub category: String,
    #[serde(default)]
    pub search_query: String,
    pub region: Option<String>,
    pub limit: Option<usize>,
    /// When set, the session's watchlist personalises the ranking
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub success: bool,
    pub count: usize,
    pub results: Vec<ScoredCandidate>,
    pub search_query: String,
}

impl RecommendationRequest {
    fn into_query(self) -> AppResult<(Query, Option<String>)> {
        let category: Category = self.category.parse()?;
        let query = Query::new(
            category,
            &self.search_query,
            self.region.as_deref().unwrap_or(DEFAULT_REGION),
            self.limit.unwrap_or(DEFAULT_RESULT_LIMIT),
        )?;

        let session_id = self.session_id.filter(|id| !id.trim().is_empty());
        Ok((query, session_id))
    }
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let (mut query, session_id) = request.into_query()?;

    if let Some(session_id) = session_id {
        let saved = state.watchlist.get(&session_id).await;
        query = query.with_affinity(Affinity::from_items(&saved));
    }

    let results = state.aggregator.get_recommendations(&query).await?;

    Ok(Json(RecommendationResponse {
        success: true,
        count: results.len(),
        results,
        search_query: query.search_term().to_string(),
    }))
}
