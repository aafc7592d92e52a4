use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Category, InteractionEvent, InteractionStats, DEFAULT_REGION},
};

use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub session_id: String,
    pub category: String,
    #[serde(default)]
    pub search_query: String,
    pub region: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub clicked_video_id: Option<String>,
    pub clicked_position: Option<i32>,
}

impl InteractionRequest {
    fn into_event(self) -> AppResult<InteractionEvent> {
        if self.session_id.trim().is_empty() {
            return Err(AppError::InvalidInput("sessionId is required".to_string()));
        }
        let category: Category = self.category.parse()?;
        if matches!(self.clicked_position, Some(position) if position < 0) {
            return Err(AppError::InvalidInput(
                "clickedPosition must not be negative".to_string(),
            ));
        }

        Ok(InteractionEvent {
            session_id: self.session_id,
            category,
            search_term: self.search_query.trim().to_string(),
            region: self
                .region
                .map(|region| region.trim().to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            shown_candidate_ids: self.recommendations,
            clicked_candidate_id: self.clicked_video_id.filter(|id| !id.is_empty()),
            clicked_position: self.clicked_position,
            timestamp: Utc::now(),
        })
    }
}

/// Accepts an interaction and stores it in the background
pub async fn log_interaction(
    State(state): State<AppState>,
    Json(request): Json<InteractionRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let event = request.into_event()?;
    state.recorder.record(event);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "success": true, "message": "Interaction logged" })),
    ))
}

/// Aggregate interaction statistics
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<InteractionStats>> {
    let stats = state.interactions.stats().await?;
    Ok(Json(stats))
}
