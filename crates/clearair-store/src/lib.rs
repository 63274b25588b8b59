//! clearair-store - Credential store implementations.

mod file;
mod memory;

pub use file::{FileStore, PersistedSession};
pub use memory::MemoryStore;
