//! Error types for the clearair pipeline.
//!
//! A single error type with explicit variants for transport, authentication,
//! protocol, input validation and credential storage failures. Only the
//! [`AuthError`] variants are produced by the refresh protocol itself;
//! everything else is passed through from the layer that raised it.

use std::fmt;
use thiserror::Error;

/// The unified error type for clearair operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, unrecoverable session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Domain errors returned by the API (validation, not found, server fault).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, header or payload).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Credential store failures.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true when the caller should treat the operation as aborted and
    /// ask the user to sign in again.
    pub fn is_terminal_auth(&self) -> bool {
        matches!(self, Error::Auth(e) if e.is_terminal())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The login endpoint rejected the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A request was rejected and no session exists to refresh.
    #[error("no refresh credential available")]
    NoRefreshCredential,

    /// The refresh endpoint rejected the refresh credential.
    #[error("refresh rejected with HTTP {status}")]
    RefreshRejected { status: u16 },

    /// The refresh exchange could not be completed.
    #[error("refresh failed: {message}")]
    RefreshFailed { message: String },

    /// Another request already terminated the session.
    #[error("session terminated")]
    SessionTerminated,

    /// The request was still unauthorized after a successful refresh.
    #[error("request unauthorized after refresh")]
    RetryExhausted,
}

impl AuthError {
    /// Returns true for failures after which the session is gone.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthError::NoRefreshCredential
                | AuthError::RefreshRejected { .. }
                | AuthError::RefreshFailed { .. }
                | AuthError::SessionTerminated
        )
    }
}

/// A non-success response surfaced by the typed request helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Invalid header name or value.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Payload could not be encoded or decoded.
    #[error("invalid payload: {message}")]
    Payload { message: String },
}

impl From<serde_json::Error> for InvalidInputError {
    fn from(err: serde_json::Error) -> Self {
        InvalidInputError::Payload {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(InvalidInputError::from(err))
    }
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("IO error at {path}: {message}")]
    Io { path: String, message: String },

    /// Stored material could not be encoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The store lock was poisoned by a panicking writer.
    #[error("credential store lock poisoned")]
    Poisoned,
}
