use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persisted gate for prefetch runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchRunState {
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// JSON file holding the [`PrefetchRunState`]
#[derive(Debug, Clone)]
pub struct RunStateStore {
    path: PathBuf,
}

impl RunStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the state; a missing or unreadable file means "never ran"
    pub async fn load(&self) -> PrefetchRunState {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return PrefetchRunState::default(),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "Prefetch state unreadable");
                return PrefetchRunState::default();
            }
        };

        serde_json::from_slice(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %self.path.display(), "Prefetch state corrupt, ignoring");
            PrefetchRunState::default()
        })
    }

    /// Writes the state through a temp file; failures are logged only
    pub async fn save(&self, state: &PrefetchRunState) {
        if let Err(e) = self.write(state).await {
            tracing::error!(error = %e, path = %self.path.display(), "Failed to persist prefetch state");
        }
    }

    async fn write(&self, state: &PrefetchRunState) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(state).map_err(std::io::Error::other)?;
        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await
    }
}
