//! The authenticated pipeline facade used by domain services.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, field, info, instrument, warn};

use clearair_core::error::{AuthError, Error};
use clearair_core::{
    ApiResponse, Credentials, CredentialStore, Method, Navigator, OutboundRequest,
    RequestDescriptor, Result, SessionTokens, Transport,
};

use crate::config::PipelineConfig;
use crate::dispatcher::RequestDispatcher;
use crate::endpoints::{LoginRequest, TokenPairResponse, protocol_error};
use crate::refresh::RefreshCoordinator;
use crate::termination::SessionTerminator;
use crate::transport::HttpTransport;

/// Authenticated client for the platform API.
///
/// Cheap to clone; clones share the credential store and the refresh gate,
/// so concurrent requests from any clone coalesce into one refresh.
#[derive(Clone)]
pub struct AuthPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    config: PipelineConfig,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    dispatcher: RequestDispatcher,
    coordinator: RefreshCoordinator,
}

impl AuthPipeline {
    /// Build a pipeline that talks HTTP through reqwest.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.timeout)?);
        Ok(Self::with_transport(config, store, navigator, transport))
    }

    /// Build a pipeline over an arbitrary transport.
    pub fn with_transport(
        config: PipelineConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let dispatcher =
            RequestDispatcher::new(config.api.clone(), transport.clone(), store.clone());
        let terminator = SessionTerminator::new(store.clone(), navigator, &config.entry_point);
        let coordinator = RefreshCoordinator::new(
            &config,
            transport.clone(),
            store.clone(),
            dispatcher.clone(),
            terminator,
        );

        Self {
            inner: Arc::new(PipelineInner {
                config,
                transport,
                store,
                dispatcher,
                coordinator,
            }),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Returns the stored session, if any.
    pub async fn session(&self) -> Result<Option<SessionTokens>> {
        self.inner.store.read().await
    }

    /// Authenticate and store a fresh token pair.
    ///
    /// A 401 here means wrong credentials, not an expired session, so the
    /// refresh path is never involved.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        info!("Logging in");

        let request = OutboundRequest::new(
            Method::Post,
            self.inner.config.api.endpoint(&self.inner.config.login_path)?,
        )
        .with_json(&LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;

        let response = self.inner.transport.execute(request).await?;
        if response.is_unauthorized() {
            return Err(AuthError::InvalidCredentials.into());
        }
        let response = Self::check(response)?;

        let pair: TokenPairResponse = response.json()?;
        self.inner.store.write(pair.into_tokens()).await?;

        debug!("Session created");
        Ok(())
    }

    /// Sign out: tell the server, then forget the session locally.
    ///
    /// The server call is best effort; the local session is cleared even when
    /// it fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");

        if let Some(tokens) = self.inner.store.read().await? {
            let mut request = OutboundRequest::new(
                Method::Post,
                self.inner.config.api.endpoint(&self.inner.config.logout_path)?,
            );
            request
                .headers
                .insert("authorization".to_string(), tokens.access().bearer());

            match self.inner.transport.execute(request).await {
                Ok(response) if !response.is_success() => {
                    debug!(status = response.status, "Server did not accept logout")
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }

        self.inner.store.clear().await
    }

    /// Send a request through the pipeline.
    ///
    /// Any response other than the expiry signal, including error statuses,
    /// is returned unmodified.
    #[instrument(
        skip(self, request),
        fields(method = %request.method(), path = request.path(), request_id = field::Empty)
    )]
    pub async fn send(&self, request: RequestDescriptor) -> Result<ApiResponse> {
        let pending = self.inner.dispatcher.prepare(request).await?;
        Span::current().record("request_id", field::display(pending.id()));

        let response = self.inner.dispatcher.dispatch(&pending).await?;
        self.inner.coordinator.resolve(pending, response).await
    }

    /// Force a refresh of the stored session.
    pub async fn refresh_now(&self) -> Result<()> {
        self.inner.coordinator.refresh_now().await
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let response = self.send(RequestDescriptor::get(path)).await?;
        Self::check(response)?.json()
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(RequestDescriptor::post(path).json(body)?).await?;
        Self::check(response)?.json()
    }

    /// PUT a JSON body to `path` and decode the JSON response.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(RequestDescriptor::put(path).json(body)?).await?;
        Self::check(response)?.json()
    }

    /// PATCH `path` with a JSON body and decode the JSON response.
    pub async fn patch_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(RequestDescriptor::patch(path).json(body)?).await?;
        Self::check(response)?.json()
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.send(RequestDescriptor::delete(path)).await?;
        Self::check(response)?;
        Ok(())
    }

    fn check(response: ApiResponse) -> Result<ApiResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(Error::Protocol(protocol_error(&response)))
        }
    }
}

impl std::fmt::Debug for AuthPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthPipeline")
            .field("api", &self.inner.config.api)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
