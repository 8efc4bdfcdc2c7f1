//! Persisted copy of the transcript.
//!
//! The whole transcript is stored as one JSON array under [`STORAGE_KEY`] and
//! overwritten on every change. File writes are atomic (temp file + rename).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chatmeter_types::Turn;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// Fixed key the transcript is stored under.
pub const STORAGE_KEY: &str = "chat-history";

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Load the stored transcript. Nothing stored yet is an empty transcript.
    async fn load(&self) -> Result<Vec<Turn>, StoreError>;

    /// Replace the stored transcript.
    async fn save(&self, turns: &[Turn]) -> Result<(), StoreError>;

    /// Remove the stored transcript entirely.
    async fn clear(&self) -> Result<(), StoreError>;
}

// ============================================================================
// FileTranscriptStore
// ============================================================================

/// Stores the transcript at `<dir>/chat-history.json`.
pub struct FileTranscriptStore {
    path: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the history file, unique per write so concurrent saves
    /// never share one.
    fn scratch_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.tmp", ulid::Ulid::new()));
        self.path.with_file_name(name)
    }

    /// Swap in new contents so a reader sees either the old or the new
    /// transcript, never a partial one. The scratch file is removed if any
    /// step fails.
    async fn replace_contents(&self, data: &[u8]) -> Result<(), StoreError> {
        let scratch = self.scratch_path();
        let written = async {
            let mut file = fs::File::create(&scratch).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&scratch, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&scratch).await;
            return Err(StoreError::file_io(&self.path, e));
        }
        Ok(())
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn load(&self) -> Result<Vec<Turn>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::file_io(&self.path, e)),
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, turns: &[Turn]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::file_io(dir, e))?;
        }
        let data = serde_json::to_vec(turns)?;
        self.replace_contents(&data).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::file_io(&self.path, e)),
        }
    }
}

// ============================================================================
// MemoryTranscriptStore
// ============================================================================

/// Keeps the serialized transcript in memory. Useful for tests and
/// sessions that should not outlive the process.
#[derive(Default)]
pub struct MemoryTranscriptStore {
    blob: Mutex<Option<String>>,
}

impl MemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a copy is currently stored.
    pub fn is_stored(&self) -> bool {
        self.blob.lock().map(|b| b.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn load(&self) -> Result<Vec<Turn>, StoreError> {
        let blob = self.blob.lock().map(|b| b.clone()).unwrap_or_default();
        match blob {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, turns: &[Turn]) -> Result<(), StoreError> {
        let json = serde_json::to_string(turns)?;
        if let Ok(mut blob) = self.blob.lock() {
            *blob = Some(json);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut blob) = self.blob.lock() {
            *blob = None;
        }
        Ok(())
    }
}
