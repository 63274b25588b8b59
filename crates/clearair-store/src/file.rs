//! File-backed credential store.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use clearair_core::error::StorageError;
use clearair_core::{AccessToken, CredentialStore, RefreshToken, Result, SessionTokens};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Session material as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    access_token: String,
    refresh_token: String,
    /// When this pair was written.
    pub issued_at: DateTime<Utc>,
}

impl PersistedSession {
    fn from_tokens(tokens: &SessionTokens) -> Self {
        Self {
            access_token: tokens.access().as_str().to_string(),
            refresh_token: tokens.refresh().as_str().to_string(),
            issued_at: Utc::now(),
        }
    }

    pub fn tokens(&self) -> SessionTokens {
        SessionTokens::new(
            AccessToken::new(&self.access_token),
            RefreshToken::new(&self.refresh_token),
        )
    }
}

/// Credential store persisted as a JSON file readable only by its owner.
///
/// Writes go through a temporary file and a rename while holding an
/// exclusive lock on a sibling `.lock` file, so a reader in this or another
/// process sees either the old pair or the new pair.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn io_error(&self, err: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    fn open_lock(&self) -> std::result::Result<fs::File, StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))
    }

    /// Load the stored session with its metadata.
    ///
    /// A missing file is `None`. A file that cannot be parsed is also `None`,
    /// since a half-present session must not be used.
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|e| self.io_error(e))?;
        let content = fs::read_to_string(&self.path);
        lock.unlock().map_err(|e| self.io_error(e))?;

        let content = match content {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e).into()),
        };

        match serde_json::from_str::<PersistedSession>(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn store(&self, session: &PersistedSession) -> Result<()> {
        let json = serde_json::to_string_pretty(session).map_err(|e| {
            StorageError::Serialization {
                message: e.to_string(),
            }
        })?;

        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|e| self.io_error(e))?;

        let temp_path = self.temp_path();
        let written = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&temp_path)?;

            #[cfg(unix)]
            {
                let mut perms = file.metadata()?.permissions();
                perms.set_mode(0o600);
                fs::set_permissions(&temp_path, perms)?;
            }

            file.write_all(json.as_bytes())?;
            file.sync_data()?;
            fs::rename(&temp_path, &self.path)
        })();

        lock.unlock().map_err(|e| self.io_error(e))?;
        written.map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn read(&self) -> Result<Option<SessionTokens>> {
        Ok(self.load()?.map(|session| session.tokens()))
    }

    #[instrument(skip(self, tokens), fields(path = %self.path.display()))]
    async fn write(&self, tokens: SessionTokens) -> Result<()> {
        self.store(&PersistedSession::from_tokens(&tokens))?;
        debug!("Session written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|e| self.io_error(e))?;
        let removed = match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        };
        lock.unlock().map_err(|e| self.io_error(e))?;

        if removed.map_err(|e| self.io_error(e))? {
            debug!("Session cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pair(access: &str, refresh: &str) -> SessionTokens {
        SessionTokens::new(AccessToken::new(access), RefreshToken::new(refresh))
    }

    #[tokio::test]
    async fn missing_file_reads_as_signed_out() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStore::new(&path)
            .write(pair("access-1", "refresh-1"))
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        let tokens = reopened.read().await.unwrap().unwrap();
        assert_eq!(tokens, pair("access-1", "refresh-1"));
        assert!(reopened.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn write_overwrites_whole_pair() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        store.write(pair("access-1", "refresh-1")).await.unwrap();
        store.write(pair("access-2", "refresh-2")).await.unwrap();

        let tokens = store.read().await.unwrap().unwrap();
        assert_eq!(tokens.access().as_str(), "access-2");
        assert_eq!(tokens.refresh().as_str(), "refresh-2");
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        store.write(pair("a", "r")).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(store.read().await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_signed_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"access_token":"only-half"}"#).unwrap();

        let store = FileStore::new(&path);
        assert!(store.read().await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        store.write(pair("a", "r")).await.unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
