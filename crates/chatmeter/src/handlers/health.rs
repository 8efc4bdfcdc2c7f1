use axum::extract::State;
use axum::http::StatusCode;

use crate::server::AppState;

/// Process is up and serving.
pub async fn livez() -> &'static str {
    "ok"
}

/// Ready only once an upstream credential is configured; without one every
/// chat request would fail.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.provider {
        Some(_) => (StatusCode::OK, "ok"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "api key not configured"),
    }
}
