//! Root path handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::app_state::AppState;

const ROOT_LABELS: [(&str, &str); 3] = [("method", "GET"), ("route", "/"), ("status", "200")];

/// Count the request, then answer with the configured greeting.
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.metrics().http_requests.inc(&ROOT_LABELS) {
        tracing::error!(error = %e, code = e.code().as_str(), "request counter update failed");
    }

    (StatusCode::OK, state.cfg().server.greeting.clone())
}
