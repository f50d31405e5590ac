pub mod features;
pub mod health;
pub mod portfolio;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(portfolio::router())
        .merge(features::router())
        .with_state(state)
}
