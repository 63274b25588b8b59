//! Request dispatch.

use std::sync::Arc;

use tracing::{debug, instrument};

use clearair_core::{
    ApiResponse, ApiUrl, CredentialStore, OutboundRequest, PendingRequest, RequestDescriptor,
    Result, Transport,
};

/// The uniform outbound path for domain requests.
///
/// Attaches the session's access token and sends. It performs no retries and
/// does not look at status codes.
#[derive(Clone)]
pub struct RequestDispatcher {
    api: ApiUrl,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
}

impl RequestDispatcher {
    pub fn new(
        api: ApiUrl,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            api,
            transport,
            store,
        }
    }

    /// Snapshot the current access token for a new request.
    pub async fn prepare(&self, descriptor: RequestDescriptor) -> Result<PendingRequest> {
        let attached = self
            .store
            .read()
            .await?
            .map(|tokens| tokens.into_parts().0);
        Ok(PendingRequest::new(descriptor, attached))
    }

    /// Send `pending` with the token it carries.
    #[instrument(skip(self, pending), fields(request_id = %pending.id(), retried = pending.retried()))]
    pub async fn dispatch(&self, pending: &PendingRequest) -> Result<ApiResponse> {
        let request = self.build(pending)?;
        debug!(
            authenticated = request.authorization().is_some(),
            "Dispatching request"
        );
        self.transport.execute(request).await
    }

    fn build(&self, pending: &PendingRequest) -> Result<OutboundRequest> {
        let descriptor = pending.descriptor();

        let mut request = OutboundRequest::new(
            descriptor.method(),
            self.api.endpoint(descriptor.path())?,
        );
        request.query = descriptor.query_pairs().to_vec();
        request.headers = descriptor.headers().clone();
        request.body = descriptor.body_bytes().cloned();

        if request.headers.remove("authorization").is_some() {
            debug!("Dropping caller-supplied authorization header");
        }
        if let Some(token) = pending.attached() {
            request
                .headers
                .insert("authorization".to_string(), token.bearer());
        }

        Ok(request)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearair_core::{AccessToken, RefreshToken, SessionTokens};
    use clearair_store::MemoryStore;

    use crate::test_support::ScriptedTransport;

    fn make_dispatcher(store: MemoryStore, transport: Arc<ScriptedTransport>) -> RequestDispatcher {
        RequestDispatcher::new(
            ApiUrl::new("https://api.clearair.app").unwrap(),
            transport,
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn attaches_stored_access_token() {
        let transport = Arc::new(ScriptedTransport::new([ApiResponse::new(200, "{}")]));
        let store = MemoryStore::with_tokens(SessionTokens::new(
            AccessToken::new("access-1"),
            RefreshToken::new("refresh-1"),
        ));
        let dispatcher = make_dispatcher(store, transport.clone());

        let pending = dispatcher
            .prepare(RequestDescriptor::get("/profile"))
            .await
            .unwrap();
        dispatcher.dispatch(&pending).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://api.clearair.app/profile");
        assert_eq!(sent[0].authorization(), Some("Bearer access-1"));
    }

    #[tokio::test]
    async fn sends_unauthenticated_without_session() {
        let transport = Arc::new(ScriptedTransport::new([ApiResponse::new(200, "[]")]));
        let dispatcher = make_dispatcher(MemoryStore::new(), transport.clone());

        let pending = dispatcher
            .prepare(RequestDescriptor::get("/communities"))
            .await
            .unwrap();
        assert!(pending.attached().is_none());
        dispatcher.dispatch(&pending).await.unwrap();

        assert_eq!(transport.requests()[0].authorization(), None);
    }

    #[tokio::test]
    async fn drops_caller_authorization_header() {
        let transport = Arc::new(ScriptedTransport::new([ApiResponse::new(200, "{}")]));
        let dispatcher = make_dispatcher(MemoryStore::new(), transport.clone());

        let pending = dispatcher
            .prepare(RequestDescriptor::get("/profile").header("Authorization", "Bearer forged"))
            .await
            .unwrap();
        dispatcher.dispatch(&pending).await.unwrap();

        assert_eq!(transport.requests()[0].authorization(), None);
    }

    #[tokio::test]
    async fn returns_error_statuses_unmodified() {
        let transport = Arc::new(ScriptedTransport::new([ApiResponse::new(
            422,
            r#"{"error":"ValidationFailed"}"#,
        )]));
        let dispatcher = make_dispatcher(MemoryStore::new(), transport);

        let pending = dispatcher
            .prepare(RequestDescriptor::post("/quit-plans"))
            .await
            .unwrap();
        let response = dispatcher.dispatch(&pending).await.unwrap();

        assert_eq!(response.status, 422);
        assert_eq!(response.text(), r#"{"error":"ValidationFailed"}"#);
    }

    #[tokio::test]
    async fn resubmission_carries_new_token() {
        let transport = Arc::new(ScriptedTransport::new([ApiResponse::new(200, "{}")]));
        let dispatcher = make_dispatcher(MemoryStore::new(), transport.clone());

        let pending = PendingRequest::new(
            RequestDescriptor::delete("/notifications/7"),
            Some(AccessToken::new("stale")),
        )
        .mark_retried(AccessToken::new("fresh"));
        dispatcher.dispatch(&pending).await.unwrap();

        assert_eq!(transport.requests()[0].authorization(), Some("Bearer fresh"));
    }
}
