//! Fatal-path session cleanup.

use std::sync::Arc;

use tracing::{error, info, instrument};

use clearair_core::{CredentialStore, Navigator, Result};

/// Clears the session and sends the user back to the sign-in entry point.
///
/// No partial recovery is attempted.
#[derive(Clone)]
pub struct SessionTerminator {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    entry_point: String,
}

impl SessionTerminator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            entry_point: entry_point.into(),
        }
    }

    /// Clear the store, then navigate to the entry point.
    ///
    /// Navigation happens even when clearing fails. The clear error is then
    /// returned, since the stale pair may still be in the store.
    #[instrument(skip(self), fields(entry_point = %self.entry_point))]
    pub async fn terminate(&self) -> Result<()> {
        info!("Terminating session");

        let cleared = self.store.clear().await;
        if let Err(e) = &cleared {
            error!(error = %e, "Failed to clear credential store");
        }

        self.navigator.navigate(&self.entry_point);
        cleared
    }
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("entry_point", &self.entry_point)
            .finish_non_exhaustive()
    }
}
