#![allow(dead_code)]
// Common test utilities for the store integration tests.
// Provides a scriptable in-memory ChatApi plus fixture builders.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use log::LevelFilter;

use chatsync::api::{ChatApi, ChatApiError, ConversationList, MessagePage, NewConversation};
use chatsync::models::{Conversation, ConversationKind, DeliveryStatus, Message};

static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

type ApiResult<T> = Result<T, ChatApiError>;

/// Scriptable ChatApi. Conversation-level responses are consumed in FIFO
/// order; message pages are keyed by (conversation, page). A response can
/// carry a delay so tests can script overlapping in-flight requests.
#[derive(Default)]
pub struct MockApi {
    list_responses: Mutex<VecDeque<(Duration, ApiResult<ConversationList>)>>,
    create_responses: Mutex<VecDeque<ApiResult<Conversation>>>,
    delete_responses: Mutex<VecDeque<ApiResult<()>>>,
    page_responses: Mutex<HashMap<(String, u32), (Duration, ApiResult<MessagePage>)>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    page_calls: Mutex<Vec<(String, u32)>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(MockApi::default())
    }

    pub fn queue_list(&self, result: ApiResult<ConversationList>) {
        self.queue_list_after(Duration::ZERO, result);
    }

    pub fn queue_list_after(&self, delay: Duration, result: ApiResult<ConversationList>) {
        self.list_responses.lock().unwrap().push_back((delay, result));
    }

    pub fn queue_create(&self, result: ApiResult<Conversation>) {
        self.create_responses.lock().unwrap().push_back(result);
    }

    pub fn queue_delete(&self, result: ApiResult<()>) {
        self.delete_responses.lock().unwrap().push_back(result);
    }

    pub fn stage_page(&self, conversation_id: &str, page: u32, result: ApiResult<MessagePage>) {
        self.stage_page_after(conversation_id, page, Duration::ZERO, result);
    }

    pub fn stage_page_after(
        &self,
        conversation_id: &str,
        page: u32,
        delay: Duration,
        result: ApiResult<MessagePage>,
    ) {
        self.page_responses
            .lock()
            .unwrap()
            .insert((conversation_id.to_string(), page), (delay, result));
    }

    /// Every (conversation, page) pair fetched so far, in call order.
    pub fn page_fetches(&self) -> Vec<(String, u32)> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn clear_page_fetches(&self) {
        self.page_calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatApi for MockApi {
    async fn get_conversations(&self) -> ApiResult<ConversationList> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = self
            .list_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                (
                    Duration::ZERO,
                    Err(ChatApiError::Api("no scripted conversation list".to_string())),
                )
            });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn create_conversation(&self, _req: &NewConversation) -> ApiResult<Conversation> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatApiError::Api("no scripted create response".to_string())))
    }

    async fn delete_conversation(&self, _id: &str) -> ApiResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.delete_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatApiError::Api("no scripted delete response".to_string())))
    }

    async fn get_messages(&self, conversation_id: &str, page: u32) -> ApiResult<MessagePage> {
        self.page_calls
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), page));
        let staged = self
            .page_responses
            .lock()
            .unwrap()
            .remove(&(conversation_id.to_string(), page));
        let (delay, result) = staged.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(ChatApiError::Api(format!(
                    "no scripted page {} for conversation {}",
                    page, conversation_id
                ))),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

pub fn conversation(id: &str) -> Conversation {
    Conversation {
        id: id.to_string(),
        kind: ConversationKind::Private,
        name: None,
        participant_ids: vec!["u1".to_string(), "u2".to_string()],
        last_activity: None,
    }
}

pub fn list(conversations: Vec<Conversation>) -> ConversationList {
    ConversationList { conversations }
}

pub fn message(id: &str, conversation_id: &str, timestamp: u64) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        sender_id: "u2".to_string(),
        content: format!("message {}", id),
        timestamp,
        delivery_status: DeliveryStatus::Delivered,
        edited: false,
    }
}

pub fn page(messages: Vec<Message>, pages: u32) -> MessagePage {
    MessagePage { messages, pages }
}

pub fn conversation_ids(conversations: &[Conversation]) -> Vec<String> {
    conversations.iter().map(|c| c.id.clone()).collect()
}

pub fn message_ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}
