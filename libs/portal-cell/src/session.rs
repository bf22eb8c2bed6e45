use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::PortalError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default)]
    splash_seen: bool,
}

/// Client-local persisted state, kept as a small JSON file.
///
/// The file is re-read on every access so a token written by another handle
/// is seen immediately. A missing file means a fresh install.
pub struct LocalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredSession, PortalError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(StoredSession::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn modify<F>(&self, change: F) -> Result<(), PortalError>
    where
        F: FnOnce(&mut StoredSession),
    {
        let _guard = self.write_lock.lock().await;
        let mut stored = match self.load().await {
            Ok(stored) => stored,
            Err(PortalError::Storage(reason)) => {
                warn!("Session file {} unreadable, starting afresh: {}", self.path.display(), reason);
                StoredSession::default()
            }
            Err(e) => return Err(e),
        };
        change(&mut stored);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Replace the file in one rename so readers never see a partial write.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, serde_json::to_vec_pretty(&stored)?).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!("Session file {} updated", self.path.display());
        Ok(())
    }

    pub async fn token(&self) -> Result<Option<String>, PortalError> {
        Ok(self.load().await?.token)
    }

    pub async fn set_token(&self, token: &str) -> Result<(), PortalError> {
        let token = token.to_string();
        self.modify(|s| s.token = Some(token)).await
    }

    pub async fn clear_token(&self) -> Result<(), PortalError> {
        self.modify(|s| s.token = None).await
    }

    pub async fn splash_seen(&self) -> Result<bool, PortalError> {
        Ok(self.load().await?.splash_seen)
    }

    pub async fn mark_splash_seen(&self) -> Result<(), PortalError> {
        self.modify(|s| s.splash_seen = true).await
    }
}
