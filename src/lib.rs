// Client-side data synchronization layer for a chat application.
// The stores in `store` keep local conversation and message state consistent
// with a remote API (`api`) and with live push events.

pub mod api;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

// Re-export main types for convenience
pub use models::*;
pub use store::{ConversationStore, MessageStore};
