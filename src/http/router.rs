//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Scheduling pipeline
        .route("/tournaments/{tournament_id}/zones", post(handlers::build_zones))
        .route("/tournaments/{tournament_id}/fixture", post(handlers::generate_fixture))
        .route("/tournaments/{tournament_id}/bracket", post(handlers::generate_bracket))
        .route("/tournaments/{tournament_id}/phase", post(handlers::transition_phase))
        // Results and standings
        .route("/zones/{zone_id}/standings", get(handlers::get_standings))
        .route("/matches/{match_id}/result", post(handlers::confirm_result))
        .route("/bracket-matches/{match_id}/result", post(handlers::advance_winner));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
