//! Session persistence port and the client-side backends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use super::PersistedSession;
use crate::error::SessionError;

/// Storage for the persisted session pair.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Load the stored session, `None` when nothing is stored.
    async fn load(&self) -> Result<Option<PersistedSession>, SessionError>;

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionError>;

    /// Remove the stored session. Clearing an empty backend succeeds.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// In-process backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    session: Mutex<Option<PersistedSession>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.session.lock().await.take();
        Ok(())
    }
}

/// JSON file holding `access_token` and `user`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Option<PersistedSession>, SessionError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
