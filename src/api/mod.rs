// Remote chat API surface consumed by the stores.
// The stores only depend on the ChatApi trait; the concrete HTTP
// implementation lives in http.rs and tests substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Conversation, ConversationKind, Message};

pub mod http;

pub use http::HttpChatApi;

#[derive(Debug, Error)]
pub enum ChatApiError {
    /// Failure reported by the server, carrying its display message.
    #[error("{0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Request rejected locally before any network call was made.
    #[error("{0}")]
    Invalid(String),
}

/// Extract a human-readable message from an API failure, falling back to a
/// fixed per-call-site string when the failure carries nothing useful.
pub fn error_message(err: &ChatApiError, fallback: &str) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        msg
    }
}

/// Parameters for creating a conversation. `participant_ids` must be
/// non-empty and `name` is required when `kind` is [`ConversationKind::Group`];
/// the conversation store validates both before submitting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub kind: ConversationKind,
    pub participant_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationList {
    /// Empty when the server omits the field entirely.
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationEnvelope {
    pub conversation: Conversation,
}

/// One page of a conversation's history. Page numbers are 1-based and count
/// backward in time: page 1 is the most recent slice, higher pages are older.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Server-reported total number of pages for this conversation.
    #[serde(default)]
    pub pages: u32,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn get_conversations(&self) -> Result<ConversationList, ChatApiError>;

    async fn create_conversation(
        &self,
        req: &NewConversation,
    ) -> Result<Conversation, ChatApiError>;

    async fn delete_conversation(&self, id: &str) -> Result<(), ChatApiError>;

    async fn get_messages(
        &self,
        conversation_id: &str,
        page: u32,
    ) -> Result<MessagePage, ChatApiError>;
}
