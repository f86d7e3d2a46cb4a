// Conversation list store.
// Holds the authoritative local copy of "conversations visible to the current
// user"; the server remains the source of truth and load() replaces the list
// wholesale rather than merging.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::Mutex as TokioMutex;

use crate::api::{error_message, ChatApi, ChatApiError, NewConversation};
use crate::models::{Conversation, ConversationKind, ConversationPatch};

struct ConversationState {
    conversations: Vec<Conversation>,
    loading: bool,
    error: Option<String>,
    // Sequence number of the most recently dispatched load. A response whose
    // sequence no longer matches lost the race to a newer load and is dropped.
    load_seq: u64,
}

pub struct ConversationStore<A: ChatApi> {
    api: Arc<A>,
    state: Arc<TokioMutex<ConversationState>>,
}

impl<A: ChatApi> Clone for ConversationStore<A> {
    fn clone(&self) -> Self {
        ConversationStore {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A: ChatApi> ConversationStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        ConversationStore {
            api,
            state: Arc::new(TokioMutex::new(ConversationState {
                conversations: Vec::new(),
                loading: false,
                error: None,
                load_seq: 0,
            })),
        }
    }

    /// Fetch the full conversation list from the server and replace the local
    /// copy with it. Failures land in the error field instead of being raised;
    /// the previous list is kept. Safe to call repeatedly; when calls overlap,
    /// only the latest dispatched one determines the final state.
    pub async fn load(&self) {
        let seq = {
            let mut state = self.state.lock().await;
            state.load_seq += 1;
            state.loading = true;
            state.error = None;
            state.load_seq
        };

        let result = self.api.get_conversations().await;

        let mut state = self.state.lock().await;
        if state.load_seq != seq {
            debug!(
                "Discarding stale conversation list response (seq {}, current {})",
                seq, state.load_seq
            );
            return;
        }
        state.loading = false;
        match result {
            Ok(list) => {
                info!("Loaded {} conversations", list.conversations.len());
                state.conversations = list.conversations;
            }
            Err(e) => {
                warn!("Failed to load conversations: {}", e);
                state.error = Some(error_message(&e, "Failed to load conversations"));
            }
        }
    }

    /// Create a conversation and prepend it to the local list. Unlike load(),
    /// failures are returned to the caller, who is reacting to a direct user
    /// action and wants synchronous feedback.
    pub async fn create(&self, req: NewConversation) -> Result<Conversation, ChatApiError> {
        if req.participant_ids.is_empty() {
            return Err(ChatApiError::Invalid(
                "a conversation needs at least one participant".to_string(),
            ));
        }
        if req.kind == ConversationKind::Group
            && req.name.as_deref().map_or(true, |n| n.trim().is_empty())
        {
            return Err(ChatApiError::Invalid(
                "group conversations require a name".to_string(),
            ));
        }

        let conversation = match self.api.create_conversation(&req).await {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!("Failed to create conversation: {}", e);
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        // The server may hand back an already-existing private conversation;
        // drop any same-id entry so the list never holds duplicate ids.
        state.conversations.retain(|c| c.id != conversation.id);
        state.conversations.insert(0, conversation.clone());
        info!("Created conversation {}", conversation.id);
        Ok(conversation)
    }

    /// Delete a conversation on the server, then drop it from the local list.
    /// On failure the list is left untouched and the error is returned.
    pub async fn delete(&self, id: &str) -> Result<(), ChatApiError> {
        if let Err(e) = self.api.delete_conversation(id).await {
            warn!("Failed to delete conversation {}: {}", id, e);
            return Err(e);
        }
        let mut state = self.state.lock().await;
        state.conversations.retain(|c| c.id != id);
        info!("Deleted conversation {}", id);
        Ok(())
    }

    /// Merge a partial update into the matching entry without contacting the
    /// server. Used to reflect side-channel events, e.g. a new message bumping
    /// last activity. No-op when the id is unknown.
    pub async fn patch(&self, id: &str, patch: ConversationPatch) {
        let mut state = self.state.lock().await;
        if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
            conversation.apply(patch);
        } else {
            debug!("Patch for unknown conversation {} ignored", id);
        }
    }

    /// Snapshot of the current list, most recently created first.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Description of the most recent load failure, cleared by the next load.
    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}
