//! Pipeline configuration.

use std::time::Duration;

use clearair_core::ApiUrl;

use crate::endpoints;

/// Default HTTP request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and limits for an [`AuthPipeline`](crate::AuthPipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api: ApiUrl,
    pub login_path: String,
    pub refresh_path: String,
    pub logout_path: String,
    /// Unauthenticated entry point the navigator is sent to on termination.
    pub entry_point: String,
    pub timeout: Duration,
}

impl PipelineConfig {
    pub fn new(api: ApiUrl) -> Self {
        Self {
            api,
            login_path: endpoints::LOGIN.to_string(),
            refresh_path: endpoints::REFRESH.to_string(),
            logout_path: endpoints::LOGOUT.to_string(),
            entry_point: endpoints::ENTRY_POINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
