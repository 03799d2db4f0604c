//! Listener behavior over the in-memory connection
//!
//! Covers the acknowledgment contract: one response per request, `200 OK`
//! as soon as decoding succeeds (regardless of what processing does
//! later), `500` with no dispatch when decoding fails.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};

use sotto_core::{
    Address, Content, ConversationId, DecryptError, DecryptionGateway, Envelope, ManualClock,
    MessageKey, WIRE_TYPE_CIPHERTEXT,
};
use sotto_pipeline::{
    ClientEvent, DeliveryReceiptCorrelator, DecryptionPipeline, MessageReceivedHandler,
    MessageRouter, NoopBadge, Notifier, UnreadTracker,
};
use sotto_store::{
    ConversationStore, InMemoryConversationStore, InMemoryCounterStore, InMemoryMessageStore,
    MessageStore,
};
use sotto_transport::{channel, EnvelopeCodec, PostcardCodec, SignalListener, STATUS_ERROR};

/// Valid transport wrappings start with this byte; the rest is plaintext
const WRAP: u8 = 0x01;

/// Gateway whose transport layer is a one-byte wrapper and whose full
/// decrypt either answers immediately or hangs forever
struct TestGateway {
    stall_decrypt: bool,
}

#[async_trait]
impl DecryptionGateway for TestGateway {
    async fn open_transport(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptError> {
        match ciphertext.split_first() {
            Some((&WRAP, plaintext)) => Ok(plaintext.to_vec()),
            _ => Err(DecryptError::BadCiphertext("bad wrapping".to_owned())),
        }
    }

    async fn decrypt(&self, _envelope: &Envelope) -> Result<Content, DecryptError> {
        if self.stall_decrypt {
            // Never resolves; the ack must not wait for this
            std::future::pending::<()>().await;
        }
        Ok(Content::text("hi"))
    }
}

struct Stack {
    conversations: Arc<InMemoryConversationStore>,
    messages: Arc<InMemoryMessageStore>,
    notifier: Notifier,
}

fn spawn_stack(
    stall_decrypt: bool,
) -> (Stack, sotto_transport::ConnectionHandle, tokio::task::JoinHandle<()>) {
    let conversations = Arc::new(InMemoryConversationStore::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let counters = Arc::new(InMemoryCounterStore::new());
    let clock = Arc::new(ManualClock::new(Utc.timestamp_millis_opt(50_000).unwrap()));
    let notifier = Notifier::new(64);
    let gateway: Arc<dyn DecryptionGateway> = Arc::new(TestGateway { stall_decrypt });

    let unread = Arc::new(UnreadTracker::new(counters, Arc::new(NoopBadge)));
    let decryption = Arc::new(DecryptionPipeline::new(
        gateway.clone(),
        conversations.clone(),
        messages.clone(),
        notifier.clone(),
        clock.clone(),
    ));
    let received = MessageReceivedHandler::new(
        conversations.clone(),
        messages.clone(),
        unread,
        decryption,
        clock,
    );
    let receipts = DeliveryReceiptCorrelator::new(conversations.clone(), messages.clone());
    let router = Arc::new(MessageRouter::new(received, receipts));

    let listener = SignalListener::new(
        gateway,
        Arc::new(PostcardCodec),
        router,
        notifier.clone(),
    );
    let (handle, requests) = channel(8);
    let task = listener.spawn(requests);

    (
        Stack {
            conversations,
            messages,
            notifier,
        },
        handle,
        task,
    )
}

fn wrapped_signal(source: &str, timestamp: u64) -> Bytes {
    let envelope = Envelope {
        source: Address::new(source),
        source_device: 1,
        relay: None,
        timestamp,
        message_type: WIRE_TYPE_CIPHERTEXT,
        payload: Bytes::from_static(b"ciphertext"),
    };
    let plaintext = PostcardCodec.encode(&envelope).unwrap();
    let mut body = vec![WRAP];
    body.extend_from_slice(&plaintext);
    Bytes::from(body)
}

#[tokio::test]
async fn test_decoded_push_is_acked_and_processed() {
    let (stack, handle, _task) = spawn_stack(false);
    let mut events = stack.notifier.subscribe();

    let response = handle.put_messages(wrapped_signal("+1555", 1_000)).await.unwrap();
    assert!(response.is_ok());

    // The message event marks the end of processing
    match events.recv().await.unwrap() {
        ClientEvent::Message(message) => assert_eq!(message.body.as_deref(), Some("hi")),
        other => panic!("expected message event, got {other:?}"),
    }

    let stored = stack
        .messages
        .get(&MessageKey {
            source: Address::new("+1555"),
            sent_at: 1_000,
        })
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_ack_does_not_wait_for_processing() {
    let (_stack, handle, _task) = spawn_stack(true);

    // Decryption never finishes, but the ack must still arrive
    let response = tokio::time::timeout(
        Duration::from_secs(1),
        handle.put_messages(wrapped_signal("+1555", 1_000)),
    )
    .await
    .expect("ack should not block on processing")
    .unwrap();

    assert!(response.is_ok());
}

#[tokio::test]
async fn test_undecodable_push_is_rejected_without_dispatch() {
    let (stack, handle, _task) = spawn_stack(false);
    let mut events = stack.notifier.subscribe();

    let response = handle
        .put_messages(Bytes::from_static(b"\xffgarbage"))
        .await
        .unwrap();
    assert_eq!(response.status, STATUS_ERROR);
    assert_eq!(response.body, "Bad encrypted websocket message");

    // Error notification, no message event, no state
    match events.recv().await.unwrap() {
        ClientEvent::TransportError { .. } => {}
        other => panic!("expected transport error event, got {other:?}"),
    }
    assert!(stack.conversations.is_empty());
    assert!(stack.messages.is_empty());
}

#[tokio::test]
async fn test_wrapped_garbage_is_rejected_by_the_codec() {
    let (stack, handle, _task) = spawn_stack(false);

    // Valid wrapping, undecodable plaintext
    let response = handle
        .put_messages(Bytes::from_static(b"\x01\xff\xff\xff"))
        .await
        .unwrap();
    assert_eq!(response.status, STATUS_ERROR);
    assert!(stack.messages.is_empty());
}

#[tokio::test]
async fn test_listener_exits_when_the_feed_closes() {
    let (_stack, handle, task) = spawn_stack(false);

    drop(handle);
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("listener should exit")
        .unwrap();
}

#[tokio::test]
async fn test_conversation_survives_undecodable_followup() {
    let (stack, handle, _task) = spawn_stack(false);

    handle.put_messages(wrapped_signal("+1555", 1_000)).await.unwrap();
    handle.put_messages(Bytes::from_static(b"\xff")).await.unwrap();

    // Give the routing task a moment to finish
    tokio::time::sleep(Duration::from_millis(50)).await;
    let conversation = stack
        .conversations
        .get(&ConversationId::private(&Address::new("+1555")))
        .await
        .unwrap();
    assert!(conversation.is_some());
    assert_eq!(stack.conversations.len(), 1);
}
