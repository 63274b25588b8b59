//! Session wiring for the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use clearair_core::{ApiUrl, Navigator};
use clearair_http::{AuthPipeline, PipelineConfig};
use clearair_store::{FileStore, PersistedSession};

use crate::output;

/// What every command needs: where the API lives and where the session is kept.
#[derive(Debug)]
pub struct SessionContext {
    api: ApiUrl,
    store: Arc<FileStore>,
}

impl SessionContext {
    pub fn new(api: &str, session_file: Option<&Path>) -> Result<Self> {
        let api = ApiUrl::new(api).context("Invalid API URL")?;
        let path = match session_file {
            Some(path) => path.to_path_buf(),
            None => default_session_path()?,
        };
        debug!(path = %path.display(), "Using session file");

        Ok(Self {
            api,
            store: Arc::new(FileStore::new(path)),
        })
    }

    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    pub fn session_file(&self) -> &Path {
        self.store.path()
    }

    /// Read the stored session along with its metadata.
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        self.store.load().context("Failed to read session file")
    }

    /// Build a pipeline over the session file.
    pub fn pipeline(&self) -> Result<AuthPipeline> {
        let config = PipelineConfig::new(self.api.clone());
        AuthPipeline::new(config, self.store.clone(), Arc::new(CliNavigator))
            .context("Failed to build HTTP client")
    }
}

/// Get the default session file path.
fn default_session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "clearair").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// A terminal has no sign-in screen, so "navigating" means telling the user
/// how to get one.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, entry_point: &str) {
        debug!(entry_point, "Session terminated");
        output::error("Session expired. Run 'clearair login' to sign in again.");
    }
}
