// Live-channel event application.
// Push events (new message, edit, delete, conversation metadata changes)
// arrive over a tokio mpsc channel and are folded into the stores here, so
// the stores themselves stay plain mutation primitives.

use log::{debug, info};
use tokio::sync::mpsc;

use super::{ConversationStore, MessageStore};
use crate::api::ChatApi;
use crate::models::{ConversationPatch, Message, MessagePatch};

#[derive(Debug, Clone)]
pub enum ChatEvent {
    MessageReceived(Message),
    MessageEdited {
        conversation_id: String,
        message_id: String,
        patch: MessagePatch,
    },
    MessageDeleted {
        conversation_id: String,
        message_id: String,
    },
    ConversationUpdated {
        conversation_id: String,
        patch: ConversationPatch,
    },
}

/// Fold one event into the stores. Message events only touch the message list
/// when they belong to the active conversation; a received message always
/// bumps the owning conversation's last activity either way.
pub async fn apply_event<A: ChatApi>(
    event: ChatEvent,
    conversations: &ConversationStore<A>,
    messages: &MessageStore<A>,
) {
    match event {
        ChatEvent::MessageReceived(message) => {
            conversations
                .patch(
                    &message.conversation_id,
                    ConversationPatch {
                        last_activity: Some(message.timestamp),
                        ..ConversationPatch::default()
                    },
                )
                .await;

            if messages.conversation_id().await.as_deref()
                != Some(message.conversation_id.as_str())
            {
                debug!(
                    "Message {} belongs to inactive conversation {}, list untouched",
                    message.id, message.conversation_id
                );
                return;
            }
            // A pushed message can race a page fetch that already contains it;
            // dedup by id here so the store's add can stay plain.
            if messages.has_message(&message.id).await {
                debug!("Skipping duplicate pushed message {}", message.id);
                return;
            }
            messages.add(message).await;
        }
        ChatEvent::MessageEdited {
            conversation_id,
            message_id,
            patch,
        } => {
            if messages.conversation_id().await.as_deref() == Some(conversation_id.as_str()) {
                messages.update(&message_id, patch).await;
            }
        }
        ChatEvent::MessageDeleted {
            conversation_id,
            message_id,
        } => {
            if messages.conversation_id().await.as_deref() == Some(conversation_id.as_str()) {
                messages.remove(&message_id).await;
            }
        }
        ChatEvent::ConversationUpdated {
            conversation_id,
            patch,
        } => {
            conversations.patch(&conversation_id, patch).await;
        }
    }
}

/// Drain the event channel until every sender is dropped, applying each event
/// as it arrives. Intended to be spawned next to the transport that feeds the
/// channel.
pub async fn run_event_pump<A: ChatApi>(
    mut rx: mpsc::Receiver<ChatEvent>,
    conversations: ConversationStore<A>,
    messages: MessageStore<A>,
) {
    info!("Event pump started");
    while let Some(event) = rx.recv().await {
        apply_event(event, &conversations, &messages).await;
    }
    info!("Event pump stopped: channel closed");
}
