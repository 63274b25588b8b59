//! Auth endpoint definitions and wire types.

use serde::{Deserialize, Serialize};

use clearair_core::error::ProtocolError;
use clearair_core::{AccessToken, ApiResponse, RefreshToken, SessionTokens};

pub const LOGIN: &str = "/auth/login";

pub const REFRESH: &str = "/auth/refresh";

pub const LOGOUT: &str = "/auth/logout";

/// Where a terminated session sends the user.
pub const ENTRY_POINT: &str = "/login";

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for refresh. The refresh token travels in the body, never
/// in an authorization header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPairResponse {
    pub fn into_tokens(self) -> SessionTokens {
        SessionTokens::new(
            AccessToken::new(self.access_token),
            RefreshToken::new(self.refresh_token),
        )
    }
}

/// Error body format used by the API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Build a protocol error from a non-success response.
pub fn protocol_error(response: &ApiResponse) -> ProtocolError {
    match serde_json::from_slice::<ErrorResponse>(&response.body) {
        Ok(body) => ProtocolError::new(response.status, body.error, body.message),
        Err(_) => ProtocolError::new(response.status, None, None),
    }
}
