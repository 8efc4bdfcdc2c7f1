//! LLM provider client for chat completions.

mod anthropic;
mod error;
mod provider;
mod types;

pub use anthropic::AnthropicProvider;
pub use error::LLMError;
pub use provider::{LLMProvider, from_env};
pub use types::{Completion, CompletionRequest, TokenUsage};
