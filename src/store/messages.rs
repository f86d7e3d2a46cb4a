// Message history store for the active conversation.
// Pages are fetched newest-first: page 1 holds the most recent messages and
// replaces the list, higher pages hold older history and are prepended so the
// list stays in chronological ascending order.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::Mutex as TokioMutex;

use crate::api::{error_message, ChatApi};
use crate::models::{Message, MessagePatch};

struct MessageState {
    conversation_id: Option<String>,
    messages: Vec<Message>,
    // Last successfully loaded page, 0 when nothing is loaded yet.
    page: u32,
    has_more: bool,
    loading: bool,
    error: Option<String>,
    // Bumped on every conversation switch. A page response carrying an old
    // epoch belongs to a previous conversation and must not touch this one.
    epoch: u64,
}

pub struct MessageStore<A: ChatApi> {
    api: Arc<A>,
    state: Arc<TokioMutex<MessageState>>,
}

impl<A: ChatApi> Clone for MessageStore<A> {
    fn clone(&self) -> Self {
        MessageStore {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A: ChatApi> MessageStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        MessageStore {
            api,
            state: Arc::new(TokioMutex::new(MessageState {
                conversation_id: None,
                messages: Vec::new(),
                page: 0,
                has_more: false,
                loading: false,
                error: None,
                epoch: 0,
            })),
        }
    }

    /// Switch the active conversation. The store resets to its initial empty
    /// state in all cases and starts loading page 1 when an id is given; a
    /// `None` id performs no fetch. In-flight responses for the previous
    /// conversation are invalidated rather than cancelled.
    pub async fn set_conversation(&self, id: Option<String>) {
        let target = {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.conversation_id = id.clone();
            state.messages.clear();
            state.page = 0;
            state.has_more = false;
            state.loading = false;
            state.error = None;
            id
        };
        if let Some(id) = target {
            self.load_page(&id, 1).await;
        }
    }

    /// Fetch one page of history. Page 1 replaces the whole list; a higher
    /// page is prepended in front of what is already loaded. The page counter
    /// and `has_more` only advance on success; failures land in the error
    /// field and leave the list untouched.
    pub async fn load_page(&self, conversation_id: &str, page: u32) {
        let epoch = {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
            state.epoch
        };
        self.fetch(conversation_id, page, epoch).await;
    }

    /// Load the next older page, but only when a conversation is active, the
    /// server reported more pages, and no load is already in flight. The
    /// guard is evaluated under the lock, so overlapping calls cannot issue
    /// duplicate backward-page requests.
    pub async fn load_more(&self) {
        let (conversation_id, page, epoch) = {
            let mut state = self.state.lock().await;
            let conversation_id = match &state.conversation_id {
                Some(id) if state.has_more && !state.loading => id.clone(),
                _ => return,
            };
            state.loading = true;
            state.error = None;
            (conversation_id, state.page + 1, state.epoch)
        };
        self.fetch(&conversation_id, page, epoch).await;
    }

    async fn fetch(&self, conversation_id: &str, page: u32, epoch: u64) {
        debug!("Fetching page {} for conversation {}", page, conversation_id);
        let result = self.api.get_messages(conversation_id, page).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch || state.conversation_id.as_deref() != Some(conversation_id) {
            debug!(
                "Discarding stale page {} response for conversation {}",
                page, conversation_id
            );
            return;
        }
        state.loading = false;
        match result {
            Ok(fetched) => {
                let count = fetched.messages.len();
                if page == 1 {
                    state.messages = fetched.messages;
                } else {
                    // Older history goes in front of what is already loaded.
                    let mut merged = fetched.messages;
                    merged.append(&mut state.messages);
                    state.messages = merged;
                }
                state.page = page;
                state.has_more = fetched.pages > page;
                info!(
                    "Loaded page {} with {} messages for conversation {} (more: {})",
                    page, count, conversation_id, state.has_more
                );
            }
            Err(e) => {
                warn!(
                    "Failed to load page {} for conversation {}: {}",
                    page, conversation_id, e
                );
                state.error = Some(error_message(&e, "Failed to load messages"));
            }
        }
    }

    /// Append a message to the end of the list. Used for sent messages and
    /// live pushes; no deduplication happens here, the caller is responsible
    /// for not double-adding.
    pub async fn add(&self, message: Message) {
        let mut state = self.state.lock().await;
        state.messages.push(message);
    }

    /// Merge a partial update into the matching message. No-op on a missing id.
    pub async fn update(&self, id: &str, patch: MessagePatch) {
        let mut state = self.state.lock().await;
        if let Some(message) = state.messages.iter_mut().find(|m| m.id == id) {
            message.apply(patch);
        } else {
            debug!("Update for unknown message {} ignored", id);
        }
    }

    /// Remove the matching message. No-op on a missing id.
    pub async fn remove(&self, id: &str) {
        let mut state = self.state.lock().await;
        state.messages.retain(|m| m.id != id);
    }

    /// Snapshot of the loaded history in chronological ascending order.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    pub async fn has_message(&self, id: &str) -> bool {
        self.state.lock().await.messages.iter().any(|m| m.id == id)
    }

    pub async fn conversation_id(&self) -> Option<String> {
        self.state.lock().await.conversation_id.clone()
    }

    /// Last successfully loaded page number, 0 before any load.
    pub async fn current_page(&self) -> u32 {
        self.state.lock().await.page
    }

    pub async fn has_more(&self) -> bool {
        self.state.lock().await.has_more
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Description of the most recent page-load failure, cleared by the next
    /// load attempt.
    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}
