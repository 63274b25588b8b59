//! HTTP transport trait.

use async_trait::async_trait;

use crate::Result;
use crate::types::{ApiResponse, OutboundRequest};

/// Sends a resolved request and returns whatever the server answered.
///
/// Implementations must not interpret status codes: a 401 or a 500 is an
/// `Ok` response. Only failures to exchange a request at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> Result<ApiResponse>;
}
