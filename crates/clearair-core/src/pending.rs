//! Snapshot of an in-flight request.

use uuid::Uuid;

use crate::tokens::AccessToken;
use crate::types::RequestDescriptor;

/// A request on its way through the pipeline.
///
/// Records the access token the attempt carried and whether it has already
/// been resubmitted. `retried` only ever goes from `false` to `true`, through
/// [`PendingRequest::mark_retried`], which consumes the value.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    id: Uuid,
    descriptor: RequestDescriptor,
    attached: Option<AccessToken>,
    retried: bool,
}

impl PendingRequest {
    pub fn new(descriptor: RequestDescriptor, attached: Option<AccessToken>) -> Self {
        Self {
            id: Uuid::new_v4(),
            descriptor,
            attached,
            retried: false,
        }
    }

    /// Correlation id shared by the first attempt and its resubmission.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// The access token attached to this attempt, if any.
    pub fn attached(&self) -> Option<&AccessToken> {
        self.attached.as_ref()
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    /// Produce the one allowed resubmission, carrying `token`.
    pub fn mark_retried(self, token: AccessToken) -> Self {
        Self {
            attached: Some(token),
            retried: true,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unretried() {
        let pending = PendingRequest::new(RequestDescriptor::get("/profile"), None);
        assert!(!pending.retried());
        assert!(pending.attached().is_none());
    }

    #[test]
    fn mark_retried_keeps_identity_and_swaps_token() {
        let pending = PendingRequest::new(
            RequestDescriptor::get("/profile"),
            Some(AccessToken::new("old")),
        );
        let id = pending.id();

        let retried = pending.mark_retried(AccessToken::new("new"));
        assert!(retried.retried());
        assert_eq!(retried.id(), id);
        assert_eq!(retried.attached().map(AccessToken::as_str), Some("new"));
        assert_eq!(retried.descriptor().path(), "/profile");
    }
}
