//! Provider-neutral completion types.

use chatmeter_types::ChatMessage;

/// A single non-streaming completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    /// Conversation turns, oldest first.
    pub messages: Vec<ChatMessage>,
}

/// The reply text and the token counters reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Token usage statistics. Counters the provider omits are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
