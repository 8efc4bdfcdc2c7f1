//! Client error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from a single round-trip to the proxy.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The proxy could not be reached or the connection failed.
    #[error("could not reach chat proxy: {0}")]
    Transport(#[from] reqwest::Error),

    /// The proxy answered with a failure. Displays the message verbatim.
    #[error("{message}")]
    Proxy { status: u16, message: String },

    /// The proxy answered 2xx with a body that is not a chat reply.
    #[error("invalid response from chat proxy: {0}")]
    InvalidResponse(String),

    #[error("invalid proxy url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors from the persisted transcript copy.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file I/O error at {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt transcript at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn file_io(path: &Path, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Submissions the session refuses before anything is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyInput,

    #[error("a request is already in flight")]
    Busy,
}
