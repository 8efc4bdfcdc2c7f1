//! LLM error types.

use thiserror::Error;

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body was not valid JSON
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LLMError {
    /// The most specific human-readable message, without the status code.
    pub fn detail(&self) -> String {
        match self {
            LLMError::Request(e) => e.to_string(),
            LLMError::Api { message, .. } => message.clone(),
            LLMError::Decode(e) => format!("invalid response body: {e}"),
        }
    }
}
