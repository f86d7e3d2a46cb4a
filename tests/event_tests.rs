// Live event application tests: routing push events into both stores.

mod common;
use common::{conversation, list, message, message_ids, page, setup_logging, MockApi};

use std::sync::Arc;

use chatsync::models::{ConversationPatch, MessagePatch};
use chatsync::store::{apply_event, run_event_pump, ChatEvent, ConversationStore, MessageStore};
use tokio::sync::mpsc;

/// Stores preloaded with conversations a and b, with a as the active
/// conversation holding one message.
async fn setup_stores(
    api: &Arc<MockApi>,
) -> (ConversationStore<MockApi>, MessageStore<MockApi>) {
    let conversations = ConversationStore::new(api.clone());
    let messages = MessageStore::new(api.clone());

    api.queue_list(Ok(list(vec![conversation("a"), conversation("b")])));
    conversations.load().await;

    api.stage_page("a", 1, Ok(page(vec![message("m1", "a", 10)], 1)));
    messages.set_conversation(Some("a".to_string())).await;

    (conversations, messages)
}

#[tokio::test]
async fn received_message_appends_and_bumps_last_activity() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    apply_event(
        ChatEvent::MessageReceived(message("m2", "a", 42)),
        &conversations,
        &messages,
    )
    .await;

    assert_eq!(message_ids(&messages.messages().await), vec!["m1", "m2"]);
    let conversations = conversations.conversations().await;
    assert_eq!(conversations[0].last_activity, Some(42));
}

#[tokio::test]
async fn duplicate_pushed_message_is_skipped() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    // m1 is already present from the page-1 load.
    apply_event(
        ChatEvent::MessageReceived(message("m1", "a", 10)),
        &conversations,
        &messages,
    )
    .await;

    assert_eq!(message_ids(&messages.messages().await), vec!["m1"]);
}

#[tokio::test]
async fn message_for_inactive_conversation_only_patches_the_list() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    apply_event(
        ChatEvent::MessageReceived(message("m9", "b", 99)),
        &conversations,
        &messages,
    )
    .await;

    // The active message list stays a's; b's entry records the activity.
    assert_eq!(message_ids(&messages.messages().await), vec!["m1"]);
    let conversations = conversations.conversations().await;
    assert_eq!(conversations[1].id, "b");
    assert_eq!(conversations[1].last_activity, Some(99));
    assert_eq!(conversations[0].last_activity, None);
}

#[tokio::test]
async fn edit_and_delete_events_route_to_the_active_list() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    apply_event(
        ChatEvent::MessageEdited {
            conversation_id: "a".to_string(),
            message_id: "m1".to_string(),
            patch: MessagePatch {
                content: Some("fixed typo".to_string()),
                edited: Some(true),
                ..MessagePatch::default()
            },
        },
        &conversations,
        &messages,
    )
    .await;

    let current = messages.messages().await;
    assert_eq!(current[0].content, "fixed typo");
    assert!(current[0].edited);

    apply_event(
        ChatEvent::MessageDeleted {
            conversation_id: "a".to_string(),
            message_id: "m1".to_string(),
        },
        &conversations,
        &messages,
    )
    .await;

    assert!(messages.messages().await.is_empty());
}

#[tokio::test]
async fn edit_event_for_another_conversation_is_ignored() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    apply_event(
        ChatEvent::MessageEdited {
            conversation_id: "b".to_string(),
            message_id: "m1".to_string(),
            patch: MessagePatch {
                content: Some("should not land".to_string()),
                ..MessagePatch::default()
            },
        },
        &conversations,
        &messages,
    )
    .await;

    assert_eq!(messages.messages().await[0].content, "message m1");
}

#[tokio::test]
async fn conversation_updated_event_patches_the_entry() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    apply_event(
        ChatEvent::ConversationUpdated {
            conversation_id: "b".to_string(),
            patch: ConversationPatch {
                name: Some("Renamed".to_string()),
                ..ConversationPatch::default()
            },
        },
        &conversations,
        &messages,
    )
    .await;

    let conversations = conversations.conversations().await;
    assert_eq!(conversations[1].name.as_deref(), Some("Renamed"));
}

#[tokio::test]
async fn event_pump_drains_the_channel_until_closed() {
    setup_logging();
    let api = MockApi::new();
    let (conversations, messages) = setup_stores(&api).await;

    let (tx, rx) = mpsc::channel(8);
    let pump = tokio::spawn(run_event_pump(
        rx,
        conversations.clone(),
        messages.clone(),
    ));

    tx.send(ChatEvent::MessageReceived(message("m2", "a", 20)))
        .await
        .unwrap();
    tx.send(ChatEvent::MessageReceived(message("m3", "a", 30)))
        .await
        .unwrap();
    drop(tx);
    pump.await.unwrap();

    assert_eq!(
        message_ids(&messages.messages().await),
        vec!["m1", "m2", "m3"]
    );
}
