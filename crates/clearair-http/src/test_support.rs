//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use clearair_core::error::{StorageError, TransportError};
use clearair_core::{
    ApiResponse, CredentialStore, Navigator, OutboundRequest, Result, SessionTokens, Transport,
};
use clearair_store::MemoryStore;

enum Reply {
    Respond(ApiResponse),
    Fail,
}

/// Transport that answers from a fixed script, in order.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = ApiResponse>) -> Self {
        Self {
            replies: Mutex::new(responses.into_iter().map(Reply::Respond).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<ApiResponse>::new())
    }

    /// Append a connection failure to the script.
    pub fn then_fail(self) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Fail);
        self
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail) => Err(TransportError::Connection {
                message: "connection reset".to_string(),
            }
            .into()),
            None => panic!("transport script exhausted"),
        }
    }
}

/// Navigator that counts redirects.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: AtomicUsize,
    last: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> usize {
        self.visits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<String> {
        self.last.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, entry_point: &str) {
        self.visits.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(entry_point.to_string());
    }
}

/// Store whose writes or clears can be made to fail.
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: bool,
    fail_clears: bool,
}

impl FailingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_writes: false,
            fail_clears: false,
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_clears(mut self) -> Self {
        self.fail_clears = true;
        self
    }

    fn fault() -> StorageError {
        StorageError::Io {
            path: "session.json".to_string(),
            message: "no space left on device".to_string(),
        }
    }
}

#[async_trait]
impl CredentialStore for FailingStore {
    async fn read(&self) -> Result<Option<SessionTokens>> {
        self.inner.read().await
    }

    async fn write(&self, tokens: SessionTokens) -> Result<()> {
        if self.fail_writes {
            return Err(Self::fault().into());
        }
        self.inner.write(tokens).await
    }

    async fn clear(&self) -> Result<()> {
        if self.fail_clears {
            return Err(Self::fault().into());
        }
        self.inner.clear().await
    }
}
