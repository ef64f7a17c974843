//! Route table.

pub mod blocks;
pub mod health;
pub mod maps;

use axum::Router;

use crate::state::AppState;

/// All `/api` routes plus `/health`, without middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", maps::create_router().merge(blocks::create_router()))
        .merge(health::create_router())
        .with_state(state)
}
