//! In-process credential store.

use std::sync::RwLock;

use async_trait::async_trait;

use clearair_core::error::StorageError;
use clearair_core::{CredentialStore, Result, SessionTokens};

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tokens: RwLock<Option<SessionTokens>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that starts signed in.
    pub fn with_tokens(tokens: SessionTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn read(&self) -> Result<Option<SessionTokens>> {
        let tokens = self.tokens.read().map_err(|_| StorageError::Poisoned)?;
        Ok(tokens.clone())
    }

    async fn write(&self, tokens: SessionTokens) -> Result<()> {
        *self.tokens.write().map_err(|_| StorageError::Poisoned)? = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write().map_err(|_| StorageError::Poisoned)? = None;
        Ok(())
    }
}
