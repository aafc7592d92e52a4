use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{Candidate, WatchlistItem},
};

use super::AppState;

/// Items saved by a session
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Vec<WatchlistItem>> {
    Json(state.watchlist.get(&session_id).await)
}

/// Saves a candidate to a session's watchlist
pub async fn add(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(candidate): Json<Candidate>,
) -> AppResult<(StatusCode, Json<WatchlistItem>)> {
    if candidate.id.trim().is_empty() {
        return Err(AppError::InvalidInput("Item id is required".to_string()));
    }

    let item = state.watchlist.add(&session_id, candidate).await;
    tracing::debug!(session_id = %session_id, item_id = %item.id(), "Watchlist item saved");

    Ok((StatusCode::CREATED, Json(item)))
}

/// Removes an item from a session's watchlist
pub async fn remove(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    if state.watchlist.remove(&session_id, &item_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Item {} is not in the watchlist",
            item_id
        )))
    }
}
