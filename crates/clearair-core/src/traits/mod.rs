//! Seams between the pipeline and its collaborators.

mod navigator;
mod store;
mod transport;

pub use navigator::{LogNavigator, Navigator};
pub use store::CredentialStore;
pub use transport::Transport;
