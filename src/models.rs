// Core data types shared by the API client and the stores.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Private,
    Group,
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationKind::Private => write!(f, "private"),
            ConversationKind::Group => write!(f, "group"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
    /// Display name; always present for group conversations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub participant_ids: Vec<String>,
    /// Epoch seconds of the most recent activity the server knows about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<u64>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sending,   // Message is being sent
    Sent,      // Successfully sent to server
    Delivered, // Delivered to recipient's device
    Read,      // Read by recipient
    Failed,    // Failed to send
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    /// Epoch seconds.
    pub timestamp: u64,
    #[serde(default = "delivered")]
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub edited: bool,
}

fn delivered() -> DeliveryStatus {
    DeliveryStatus::Delivered
}

/// Partial update for a conversation entry. `Some` fields overwrite the
/// current value, `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct ConversationPatch {
    pub name: Option<String>,
    pub participant_ids: Option<Vec<String>>,
    pub last_activity: Option<u64>,
}

impl Conversation {
    pub fn apply(&mut self, patch: ConversationPatch) {
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(participant_ids) = patch.participant_ids {
            self.participant_ids = participant_ids;
        }
        if let Some(last_activity) = patch.last_activity {
            self.last_activity = Some(last_activity);
        }
    }
}

/// Partial update for a message, same merge semantics as [`ConversationPatch`].
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub delivery_status: Option<DeliveryStatus>,
    pub edited: Option<bool>,
}

impl Message {
    /// Build a locally-originated message for optimistic display, before the
    /// server has confirmed it. Gets a fresh id and the current time.
    pub fn local(conversation_id: &str, sender_id: &str, content: &str) -> Self {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            timestamp: chrono::Utc::now().timestamp() as u64,
            delivery_status: DeliveryStatus::Sending,
            edited: false,
        }
    }

    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(delivery_status) = patch.delivery_status {
            self.delivery_status = delivery_status;
        }
        if let Some(edited) = patch.edited {
            self.edited = edited;
        }
    }
}
