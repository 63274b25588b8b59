//! Credential store trait.

use async_trait::async_trait;

use crate::Result;
use crate::tokens::SessionTokens;

/// The single source of truth for the session's credential pair.
///
/// There is no way to set one token without the other.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored pair, or `None` when signed out.
    ///
    /// Absence is not an error; errors are reserved for faults of the
    /// backing medium.
    async fn read(&self) -> Result<Option<SessionTokens>>;

    /// Replace both tokens at once.
    async fn write(&self, tokens: SessionTokens) -> Result<()>;

    /// Remove both tokens. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}
