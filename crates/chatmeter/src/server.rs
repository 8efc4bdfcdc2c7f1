use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;

use crate::config::{Config, UpstreamConfig};
use crate::handlers;
use crate::llm::{self, LLMProvider};
use crate::pricing::Pricing;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the API key is missing.
    pub provider: Option<Arc<dyn LLMProvider>>,
    pub upstream: Arc<UpstreamConfig>,
    pub pricing: Pricing,
}

impl AppState {
    /// Resolve the provider from the environment named in `config`.
    pub fn from_config(config: Config) -> Self {
        let provider = llm::from_env(&config.upstream);
        Self {
            provider,
            upstream: Arc::new(config.upstream),
            pricing: config.pricing,
        }
    }
}

pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    let api = Router::new().route("/chat", post(handlers::chat));

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .nest("/api", api)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
}
