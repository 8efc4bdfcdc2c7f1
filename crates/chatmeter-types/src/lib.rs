//! Wire and transcript types shared by the chatmeter proxy and its clients.
//!
//! The proxy speaks a single JSON contract on `POST /api/chat`:
//!
//! - request: `{"messages": [{"role": "user", "content": "..."}, ...]}`, or the
//!   deprecated single-turn shape `{"message": "..."}`
//! - success: `{"message": "...", "usage": {...}}`
//! - failure: `{"error": "..."}`

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversation
// ============================================================================

/// The role of a message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A role-tagged message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
///
/// The multi-turn shape is canonical. When a body carries both keys the
/// multi-turn shape wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatRequest {
    /// Full ordered conversation, oldest first.
    Conversation { messages: Vec<ChatMessage> },
    /// Deprecated: a single user prompt with no history.
    Single { message: String },
}

impl ChatRequest {
    /// Normalize either shape into an ordered list of messages.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            ChatRequest::Conversation { messages } => messages,
            ChatRequest::Single { message } => vec![ChatMessage::user(message)],
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Token counts and derived dollar costs for one completion.
///
/// Costs are fixed-point decimal strings with exactly six fractional digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageReport {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub input_cost: String,
    pub output_cost: String,
    pub total_cost: String,
}

/// Successful proxy reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub message: String,
    pub usage: UsageReport,
}

/// Failure payload returned by the proxy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Either outcome of `POST /api/chat`. Never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProxyResponse {
    Reply(ChatReply),
    Error(ErrorBody),
}

// ============================================================================
// Transcript
// ============================================================================

/// One entry of a client transcript. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageReport>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_error: false,
            usage: None,
        }
    }

    pub fn assistant(reply: ChatReply) -> Self {
        Self {
            role: Role::Assistant,
            content: reply.message,
            is_error: false,
            usage: Some(reply.usage),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: message.into(),
            is_error: true,
            usage: None,
        }
    }

    /// The role/content pair replayed to the proxy.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}
