//! Client side of chatmeter.
//!
//! A [`ChatSession`] owns an append-only [`Transcript`], mirrors it into a
//! [`TranscriptStore`] after every change, and drives a [`ChatBackend`]
//! (normally [`ProxyClient`]) with at most one request in flight.

mod error;
mod proxy;
mod session;
mod store;
mod transcript;

pub use error::{ClientError, SessionError, StoreError};
pub use proxy::{ChatBackend, ProxyClient};
pub use session::{ChatSession, RequestMode};
pub use store::{FileTranscriptStore, MemoryTranscriptStore, STORAGE_KEY, TranscriptStore};
pub use transcript::Transcript;

pub use chatmeter_types::{ChatReply, Role, Turn, UsageReport};
