//! Core pipeline types.
//!
//! These types enforce invariants at construction time: the API base URL is
//! validated once, and request descriptors have no way to carry credentials.

mod api_url;
mod method;
mod request;
mod response;

pub use api_url::ApiUrl;
pub use method::Method;
pub use request::{Headers, OutboundRequest, RequestDescriptor};
pub use response::ApiResponse;
