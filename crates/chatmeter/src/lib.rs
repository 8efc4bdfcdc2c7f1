//! Chatmeter - a chat proxy for the Anthropic Messages API that annotates
//! every reply with token usage and a dollar-cost estimate.

pub mod build_info;
pub mod config;
pub mod handlers;
pub mod llm;
pub mod pricing;
pub mod response;
pub mod server;
