//! Token types for authenticated API access.

use std::fmt;

/// An access token attached to authorized requests.
///
/// Access tokens are short-lived and sent as a bearer authorization header.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token used only to obtain a new token pair.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// The credential pair that makes up an authenticated session.
///
/// There is no way to build a pair with only one half, so a store holding
/// `Option<SessionTokens>` is either fully signed in or fully signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    access: AccessToken,
    refresh: RefreshToken,
}

impl SessionTokens {
    pub fn new(access: AccessToken, refresh: RefreshToken) -> Self {
        Self { access, refresh }
    }

    pub fn access(&self) -> &AccessToken {
        &self.access
    }

    pub fn refresh(&self) -> &RefreshToken {
        &self.refresh
    }

    /// Split the pair into its two tokens.
    pub fn into_parts(self) -> (AccessToken, RefreshToken) {
        (self.access, self.refresh)
    }
}
