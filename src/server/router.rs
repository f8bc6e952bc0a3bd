use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Roster queries
        .route("/seniors", get(handlers::list_seniors))
        .route("/seniors/:roll_no", get(handlers::get_senior))
        .route("/search", get(handlers::search_by_name))
        .route("/filters", get(handlers::filters))
        .route("/reload", post(handlers::reload_dataset))
        // External profile lookup
        .route("/proxy/linkedin-search", post(handlers::linkedin_search))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
