//! Session refresh protocol.
//!
//! A request whose first attempt comes back 401 is held while the refresh
//! token is exchanged for a new pair, then resubmitted exactly once with the
//! new access token. Whatever the resubmission returns is final.
//!
//! Exchanges are single-flight. Every request that saw a 401 queues on one
//! async mutex before looking at the store. The first one through performs
//! the exchange. The rest find an access token different from the one they
//! sent and reuse it, or find the store empty because the exchange failed
//! and the session was terminated.
//!
//! Recovery runs on its own task. A caller that stops waiting does not stop
//! an exchange in flight: the rotated pair is still stored, or the session
//! still terminated, before the gate is released.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{Instrument, Span, debug, info, instrument, warn};

use clearair_core::error::AuthError;
use clearair_core::{
    AccessToken, ApiResponse, ApiUrl, CredentialStore, Interception, Method, OutboundRequest,
    PendingRequest, RefreshToken, Result, SessionTokens, Transport, intercept,
};

use crate::config::PipelineConfig;
use crate::dispatcher::RequestDispatcher;
use crate::endpoints::{RefreshRequest, TokenPairResponse};
use crate::termination::SessionTerminator;

/// Detects the expiry signal and drives refresh-and-retry.
#[derive(Clone)]
pub struct RefreshCoordinator {
    dispatcher: RequestDispatcher,
    state: Arc<RefreshState>,
}

/// Everything a detached recovery task needs.
struct RefreshState {
    api: ApiUrl,
    refresh_path: String,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    terminator: SessionTerminator,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(
        config: &PipelineConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        dispatcher: RequestDispatcher,
        terminator: SessionTerminator,
    ) -> Self {
        Self {
            dispatcher,
            state: Arc::new(RefreshState {
                api: config.api.clone(),
                refresh_path: config.refresh_path.clone(),
                transport,
                store,
                terminator,
                gate: Mutex::new(()),
            }),
        }
    }

    /// Decide the fate of `response` to `pending`, refreshing and
    /// resubmitting if it carries the expiry signal.
    #[instrument(skip(self, pending, response), fields(request_id = %pending.id(), status = response.status))]
    pub async fn resolve(
        &self,
        pending: PendingRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse> {
        match intercept(&pending, &response) {
            Interception::PassThrough => Ok(response),
            Interception::Reject => {
                warn!("Request unauthorized after refresh");
                Err(AuthError::RetryExhausted.into())
            }
            Interception::Refresh => {
                info!("Access token rejected, refreshing session");

                let token = self.recover(&pending).await?;
                let retried = pending.mark_retried(token);
                let response = self.dispatcher.dispatch(&retried).await?;

                match intercept(&retried, &response) {
                    Interception::Reject => {
                        warn!("Request unauthorized after refresh");
                        Err(AuthError::RetryExhausted.into())
                    }
                    _ => Ok(response),
                }
            }
        }
    }

    /// Obtain an access token newer than the one `pending` carried.
    ///
    /// Terminates the session when no refresh is possible. Dropping the
    /// returned future does not cancel the recovery.
    pub async fn recover(&self, pending: &PendingRequest) -> Result<AccessToken> {
        let state = self.state.clone();
        let attached = pending.attached().cloned();

        let task = tokio::spawn(
            async move { state.recover(attached.as_ref()).await }.instrument(Span::current()),
        );
        task.await.map_err(|e| AuthError::RefreshFailed {
            message: format!("refresh task aborted: {}", e),
        })?
    }

    /// Exchange the stored refresh token now, regardless of expiry.
    #[instrument(skip(self))]
    pub async fn refresh_now(&self) -> Result<()> {
        let state = self.state.clone();

        let task =
            tokio::spawn(async move { state.refresh_now().await }.instrument(Span::current()));
        task.await.map_err(|e| AuthError::RefreshFailed {
            message: format!("refresh task aborted: {}", e),
        })?
    }
}

impl RefreshState {
    async fn recover(&self, attached: Option<&AccessToken>) -> Result<AccessToken> {
        let _gate = self.gate.lock().await;

        match self.store.read().await? {
            Some(tokens) if Some(tokens.access()) != attached => {
                debug!("Session already refreshed by a concurrent request");
                Ok(tokens.into_parts().0)
            }
            Some(tokens) => {
                let tokens = self.refresh_locked(tokens.refresh()).await?;
                Ok(tokens.into_parts().0)
            }
            None if attached.is_some() => {
                debug!("Session already terminated by a concurrent request");
                Err(AuthError::SessionTerminated.into())
            }
            None => {
                warn!("No session to refresh");
                self.terminator.terminate().await?;
                Err(AuthError::NoRefreshCredential.into())
            }
        }
    }

    async fn refresh_now(&self) -> Result<()> {
        let _gate = self.gate.lock().await;

        let tokens = self
            .store
            .read()
            .await?
            .ok_or(AuthError::NoRefreshCredential)?;
        self.refresh_locked(tokens.refresh()).await?;
        Ok(())
    }

    /// Must be called with the gate held.
    ///
    /// If the store cannot be cleared while terminating, that storage error
    /// is returned in place of the refresh failure.
    async fn refresh_locked(&self, refresh: &RefreshToken) -> Result<SessionTokens> {
        let tokens = match self.exchange(refresh).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Refresh failed");
                self.terminator.terminate().await?;
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.write(tokens.clone()).await {
            // The server has already rotated the pair; the old one is dead.
            warn!(error = %e, "Failed to store refreshed session");
            if let Err(clear) = self.terminator.terminate().await {
                warn!(error = %clear, "Stale session left in store");
            }
            return Err(e);
        }

        info!("Session refreshed");
        Ok(tokens)
    }

    async fn exchange(&self, refresh: &RefreshToken) -> std::result::Result<SessionTokens, AuthError> {
        let failed = |message: String| AuthError::RefreshFailed { message };

        let url = self
            .api
            .endpoint(&self.refresh_path)
            .map_err(|e| failed(e.to_string()))?;
        let request = OutboundRequest::new(Method::Post, url)
            .with_json(&RefreshRequest {
                refresh_token: refresh.as_str(),
            })
            .map_err(|e| failed(e.to_string()))?;

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.is_success() {
            return Err(AuthError::RefreshRejected {
                status: response.status,
            });
        }

        let pair: TokenPairResponse = response.json().map_err(|e| failed(e.to_string()))?;
        Ok(pair.into_tokens())
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("api", &self.state.api)
            .field("refresh_path", &self.state.refresh_path)
            .finish_non_exhaustive()
    }
}
