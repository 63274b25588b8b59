//! Navigation to the unauthenticated entry point.

use tracing::warn;

/// Moves the user to the sign-in surface after a session is terminated.
pub trait Navigator: Send + Sync {
    fn navigate(&self, entry_point: &str);
}

/// Navigator for headless use: records the redirect in the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, entry_point: &str) {
        warn!(entry_point, "Session terminated, sign-in required");
    }
}
