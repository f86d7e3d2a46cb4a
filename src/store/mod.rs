// Client-side synchronization stores.
//
// Each store owns the local copy of one slice of server state: the
// conversation list visible to the current user, and the message history of
// the currently active conversation. Network failures never take prior state
// down with them; background loads record their error in an observable field
// while user-triggered operations (create/delete) return it to the caller.

pub mod conversations;
pub mod events;
pub mod messages;

pub use conversations::ConversationStore;
pub use events::{apply_event, run_event_pump, ChatEvent};
pub use messages::MessageStore;
