//! clearair-core - Core types and traits for the authenticated request pipeline.

pub mod credentials;
pub mod error;
pub mod interceptor;
pub mod pending;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use interceptor::{Interception, intercept};
pub use pending::PendingRequest;
pub use tokens::{AccessToken, RefreshToken, SessionTokens};
pub use traits::{CredentialStore, LogNavigator, Navigator, Transport};
pub use types::{ApiResponse, ApiUrl, Headers, Method, OutboundRequest, RequestDescriptor};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
