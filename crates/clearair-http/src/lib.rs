//! clearair-http - Authenticated request pipeline.
//!
//! Every request from a domain service goes through an [`AuthPipeline`]:
//!
//! 1. the [`RequestDispatcher`] attaches the stored access token and sends it;
//! 2. a 401 hands control to the [`RefreshCoordinator`], which exchanges the
//!    refresh token for a new pair and resubmits the request once;
//! 3. when no refresh is possible the [`SessionTerminator`] clears the store
//!    and sends the user back to the sign-in entry point.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use clearair_core::{ApiUrl, Credentials, LogNavigator};
//! use clearair_http::{AuthPipeline, PipelineConfig};
//! use clearair_store::MemoryStore;
//!
//! # async fn example() -> clearair_core::Result<()> {
//! let config = PipelineConfig::new(ApiUrl::new("https://api.clearair.app")?);
//! let pipeline = AuthPipeline::new(config, Arc::new(MemoryStore::new()), Arc::new(LogNavigator))?;
//!
//! pipeline.login(&Credentials::new("sam@example.com", "hunter2")).await?;
//! let streak: serde_json::Value = pipeline.get_json("/progress/streak").await?;
//! println!("{streak}");
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatcher;
mod endpoints;
mod pipeline;
mod refresh;
mod termination;
mod transport;

#[cfg(test)]
mod test_support;

pub use config::PipelineConfig;
pub use dispatcher::RequestDispatcher;
pub use pipeline::AuthPipeline;
pub use refresh::RefreshCoordinator;
pub use termination::SessionTerminator;
pub use transport::HttpTransport;
