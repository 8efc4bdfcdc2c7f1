//! LLM provider trait and construction from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use super::anthropic::AnthropicProvider;
use super::error::LLMError;
use super::types::{Completion, CompletionRequest};
use crate::config::UpstreamConfig;

/// Trait for LLM providers with different API formats.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Display name used to prefix upstream error messages.
    fn name(&self) -> &'static str;

    /// Make a single, non-streaming completion request.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LLMError>;
}

/// Build the upstream provider if its API key is present in the environment.
///
/// Returns `None` when the key is missing; requests then fail with a
/// configuration error instead of reaching upstream.
pub fn from_env(upstream: &UpstreamConfig) -> Option<Arc<dyn LLMProvider>> {
    let Some(api_key) = upstream.api_key() else {
        warn!(
            env = %upstream.api_key_env,
            "Anthropic API key not set; chat requests will fail until it is configured"
        );
        return None;
    };

    let provider = AnthropicProvider::new(Client::new(), api_key, upstream.base_url.clone());
    info!(
        base_url = %upstream.base_url,
        model = %upstream.model,
        "Registered Anthropic provider"
    );
    Some(Arc::new(provider))
}
