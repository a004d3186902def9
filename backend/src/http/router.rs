//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
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

    let api_v1 = Router::new()
        // Channels
        .route(
            "/channels",
            get(handlers::list_channels).post(handlers::create_channel),
        )
        .route("/channels/{channel_id}", delete(handlers::delete_channel))
        // Lineups
        .route(
            "/channels/{channel_id}/lineup",
            get(handlers::get_lineup).put(handlers::put_lineup),
        )
        // Rendered guide
        .route("/channels/{channel_id}/guide", get(handlers::get_channel_guide))
        .route("/guide", get(handlers::get_guide))
        .route("/guide/invalidate", post(handlers::invalidate_guide))
        // Events
        .route("/events", get(handlers::stream_events));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // A day of programs for a busy channel stays well below this.
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
