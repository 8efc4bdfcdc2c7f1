//! The chat proxy handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatmeter_types::{ChatReply, ChatRequest};
use tracing::{error, info, warn};

use crate::llm::CompletionRequest;
use crate::response;
use crate::server::AppState;

/// POST /api/chat
///
/// Forwards the conversation upstream and returns `{"message", "usage"}`, or
/// `{"error"}` with status 500 when the key is missing or upstream fails.
/// Upstream status codes are never passed through.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Some(provider) = state.provider.as_ref() else {
        error!(
            env = %state.upstream.api_key_env,
            "Rejecting chat request: API key is not configured"
        );
        return response::internal_error("Anthropic API key is not configured").into_response();
    };

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return response::bad_request(rejection.body_text()).into_response();
        }
    };

    let messages = request.into_messages();
    if messages.is_empty() {
        return response::bad_request("conversation must contain at least one message")
            .into_response();
    }

    let completion_request = CompletionRequest {
        model: state.upstream.model.clone(),
        max_tokens: state.upstream.max_tokens,
        messages,
    };
    let turns = completion_request.messages.len();

    let completion = match provider.complete(completion_request).await {
        Ok(completion) => completion,
        Err(e) => {
            warn!(error = %e, turns, "Upstream chat request failed");
            return response::internal_error(format!(
                "{} API error: {}",
                provider.name(),
                e.detail()
            ))
            .into_response();
        }
    };

    let usage = state.pricing.usage_report(
        completion.usage.input_tokens,
        completion.usage.output_tokens,
    );
    info!(
        turns,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        total_cost = %usage.total_cost,
        "Chat completed"
    );

    let reply = ChatReply {
        message: completion.text,
        usage,
    };
    (StatusCode::OK, Json(reply)).into_response()
}
