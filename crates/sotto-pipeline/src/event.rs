//! Notification surface toward external listeners
//!
//! The pipeline's sole hand-off to the outside (typically UI code) is a
//! broadcast channel of [`ClientEvent`]s. Emission never blocks and never
//! fails the pipeline: a send with no subscribers, or a lagged subscriber,
//! is simply dropped.

use tokio::sync::broadcast;
use tracing::trace;

use sotto_core::Message;

/// Events emitted toward external listeners
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A message record, enriched after successful decryption or annotated
    /// with an identity-change failure. Emitted exactly once per processed
    /// content signal, never for receipts.
    Message(Message),

    /// The transport-level wrapping of a request could not be decrypted or
    /// decoded. No state was mutated for it.
    TransportError {
        /// Description of the failure
        detail: String,
    },
}

/// Broadcast handle for [`ClientEvent`]s
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<ClientEvent>,
}

impl Notifier {
    /// Create a notifier with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Get a subscription to emitted events
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emit a message notification
    pub fn message(&self, message: Message) {
        trace!(source = %message.source, sent_at = message.sent_at, "Emitting message event");
        let _ = self.tx.send(ClientEvent::Message(message));
    }

    /// Emit a transport error notification
    pub fn transport_error(&self, detail: impl Into<String>) {
        let _ = self.tx.send(ClientEvent::TransportError {
            detail: detail.into(),
        });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(1024)
    }
}
