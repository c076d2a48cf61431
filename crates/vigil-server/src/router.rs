//! Axum router wiring.
//!
//! The route table is fixed: one `GET` handler per path, resolved once when
//! the router is built. Anything else falls through to axum's 404.

use axum::{routing::get, Router};

use crate::{app_state::AppState, greet, ops};

pub const ROOT_PATH: &str = "/";
pub const HEALTH_PATH: &str = "/health";
pub const METRICS_PATH: &str = "/metrics";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ROOT_PATH, get(greet::root))
        .route(HEALTH_PATH, get(ops::health))
        .route(METRICS_PATH, get(ops::metrics))
        .with_state(state)
}
