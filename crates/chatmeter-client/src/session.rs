//! A chat session: transcript, persistence and the one-request-at-a-time rule.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chatmeter_types::{ChatRequest, Turn};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::proxy::ChatBackend;
use crate::store::TranscriptStore;
use crate::transcript::Transcript;

/// Content of the error turn when a failure carries no message.
pub const GENERIC_FAILURE: &str = "An error occurred while processing your request.";

/// What each submission sends to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// The whole transcript, including the new user turn.
    #[default]
    MultiTurn,
    /// Only the new user message (deprecated request shape).
    SingleTurn,
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn TranscriptStore>,
    mode: RequestMode,
    transcript: Mutex<Transcript>,
    loading: AtomicBool,
}

/// Clears the loading flag when the round-trip ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatSession {
    /// Open a session, restoring any persisted transcript.
    ///
    /// An unreadable persisted copy is logged and the session starts empty.
    pub async fn open(
        backend: Arc<dyn ChatBackend>,
        store: Arc<dyn TranscriptStore>,
        mode: RequestMode,
    ) -> Self {
        let turns = match store.load().await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(error = %e, "Failed to load chat history, starting empty");
                Vec::new()
            }
        };
        debug!(turns = turns.len(), "Chat session opened");

        Self {
            backend,
            store,
            mode,
            transcript: Mutex::new(Transcript::from(turns)),
            loading: AtomicBool::new(false),
        }
    }

    /// Whether a round-trip is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Snapshot of the transcript.
    pub fn turns(&self) -> Vec<Turn> {
        self.lock().turns().to_vec()
    }

    /// Send one user message and append the outcome.
    ///
    /// Returns the assistant turn that was appended: a reply carrying usage,
    /// or an error turn. Upstream and transport failures are not `Err`; they
    /// become error turns. `Err` means nothing was appended or sent.
    pub async fn submit(&self, input: &str) -> Result<Turn, SessionError> {
        let content = input.trim();
        if content.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let _in_flight = self.begin()?;

        let request = {
            let mut transcript = self.lock();
            transcript.push(Turn::user(content));
            match self.mode {
                RequestMode::MultiTurn => ChatRequest::Conversation {
                    messages: transcript.to_messages(),
                },
                RequestMode::SingleTurn => ChatRequest::Single {
                    message: content.to_string(),
                },
            }
        };
        self.persist().await;

        let turn = match self.backend.send(&request).await {
            Ok(reply) => Turn::assistant(reply),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                let message = e.to_string();
                if message.trim().is_empty() {
                    Turn::error(GENERIC_FAILURE)
                } else {
                    Turn::error(message)
                }
            }
        };

        self.lock().push(turn.clone());
        self.persist().await;
        Ok(turn)
    }

    /// Clear the transcript and remove the persisted copy.
    pub async fn reset(&self) {
        self.lock().clear();
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to remove chat history");
        }
    }

    fn begin(&self) -> Result<InFlight<'_>, SessionError> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.loading))
            .map_err(|_| SessionError::Busy)
    }

    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn persist(&self) {
        let turns = self.turns();
        if let Err(e) = self.store.save(&turns).await {
            warn!(error = %e, "Failed to save chat history");
        }
    }
}
