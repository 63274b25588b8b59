//! Response interception.
//!
//! The decision of what to do with a response is a pure function of the
//! pending request and the response, so every branch can be checked without
//! a network.

use crate::pending::PendingRequest;
use crate::types::ApiResponse;

/// What the pipeline does with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Hand the response to the caller as-is.
    PassThrough,
    /// First expiry signal: refresh the session and resubmit once.
    Refresh,
    /// Expiry signal on the resubmission: fail without refreshing again.
    Reject,
}

/// Classify a response to `pending`.
pub fn intercept(pending: &PendingRequest, response: &ApiResponse) -> Interception {
    if !response.is_unauthorized() {
        Interception::PassThrough
    } else if pending.retried() {
        Interception::Reject
    } else {
        Interception::Refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::AccessToken;
    use crate::types::RequestDescriptor;

    fn pending() -> PendingRequest {
        PendingRequest::new(
            RequestDescriptor::get("/achievements"),
            Some(AccessToken::new("token")),
        )
    }

    #[test]
    fn success_passes_through() {
        let response = ApiResponse::new(200, "[]");
        assert_eq!(intercept(&pending(), &response), Interception::PassThrough);
    }

    #[test]
    fn domain_errors_pass_through() {
        for status in [400, 403, 404, 409, 422, 500, 503] {
            let response = ApiResponse::new(status, "");
            assert_eq!(
                intercept(&pending(), &response),
                Interception::PassThrough,
                "status {status}"
            );
        }
    }

    #[test]
    fn first_unauthorized_refreshes() {
        let response = ApiResponse::new(401, "");
        assert_eq!(intercept(&pending(), &response), Interception::Refresh);
    }

    #[test]
    fn unauthorized_after_retry_is_rejected() {
        let retried = pending().mark_retried(AccessToken::new("fresh"));
        let response = ApiResponse::new(401, "");
        assert_eq!(intercept(&retried, &response), Interception::Reject);
    }

    #[test]
    fn retried_success_passes_through() {
        let retried = pending().mark_retried(AccessToken::new("fresh"));
        let response = ApiResponse::new(201, "{}");
        assert_eq!(intercept(&retried, &response), Interception::PassThrough);
    }
}
