use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod categories;
pub mod interactions;
pub mod recommendations;
mod state;
pub mod watchlist;

pub use state::{AppState, AppStateInner};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/categories", get(categories::list))
        .route("/recommendations", post(recommendations::recommend))
        .route("/interactions", post(interactions::log_interaction))
        .route("/stats", get(interactions::stats))
        .route(
            "/watchlist/:session_id",
            get(watchlist::list).post(watchlist::add),
        )
        .route("/watchlist/:session_id/:item_id", delete(watchlist::remove))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "service": env!("CARGO_PKG_NAME") })),
    )
}
