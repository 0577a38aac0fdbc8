// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod state;
pub mod validation;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::trace::TraceLayer;

use handlers::{fallback::deny_all, health, teams};
pub use state::AppState;

/// Builds the application router
///
/// Reads are public, writes need Basic credentials, and anything not listed
/// here (unknown paths as well as unsupported methods) is denied.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check).fallback(deny_all))
        // Team routes
        .route(
            "/api/teams",
            get(teams::list_teams)
                .post(teams::create_team)
                .fallback(deny_all),
        )
        .route(
            "/api/teams/filter",
            get(teams::filter_teams).fallback(deny_all),
        )
        .route(
            "/api/teams/:id",
            patch(teams::update_team_partially)
                .put(teams::update_team_fully)
                .delete(teams::delete_team)
                .fallback(deny_all),
        )
        .fallback(deny_all)
        // Middleware
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(state)
}
