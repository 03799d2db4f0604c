//! Message records and merge patches
//!
//! A message is identified by the pairing of its sender address and the
//! sender-assigned `sent_at` timestamp; neither field alone is unique. A
//! record starts life as a stub (no body) written before decryption, and is
//! enriched in place once decryption finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::{Address, ConversationId};
use crate::content::Attachment;

/// Direction of a message relative to this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Received from a peer
    Incoming,
    /// Sent by this client
    Outgoing,
}

/// Composite key of a message record
///
/// Ordered by `(source, sent_at)`, which is also the store iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    /// Sender address
    pub source: Address,
    /// Sender-assigned timestamp in milliseconds
    pub sent_at: u64,
}

/// Kind of failure recorded on a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The sender's cryptographic identity changed since last trusted
    IdentityChanged,
    /// Any other decryption failure
    Decryption,
}

/// A failure descriptor stored on a message's error list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFailure {
    /// What went wrong
    pub kind: FailureKind,
    /// Human-readable detail
    pub detail: String,
}

impl DeliveryFailure {
    /// Failure recording an identity key change for `address`
    pub fn identity_changed(address: &Address) -> Self {
        Self {
            kind: FailureKind::IdentityChanged,
            detail: format!("identity key changed for {address}"),
        }
    }
}

/// A message record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender address
    pub source: Address,
    /// Sending device of the source
    pub source_device: u32,
    /// Optional forwarding hop
    pub relay: Option<String>,
    /// Sender-assigned timestamp in milliseconds
    pub sent_at: u64,
    /// Local arrival time
    pub received_at: Option<DateTime<Utc>>,
    /// Conversation the message belongs to
    pub conversation_id: ConversationId,
    /// Incoming or outgoing
    pub direction: Direction,
    /// Plaintext body, absent until decryption succeeds
    pub body: Option<String>,
    /// Attachments, filled by decryption
    pub attachments: Vec<Attachment>,
    /// When decryption finished
    pub decrypted_at: Option<DateTime<Utc>>,
    /// Number of confirmed deliveries
    pub delivered: u32,
    /// Ordered list of failures recorded against this message
    pub errors: Vec<DeliveryFailure>,
}

impl Message {
    /// Create an empty record for `key`
    ///
    /// Defaults assume an incoming private message; patches applied on top
    /// refine both.
    pub fn from_key(key: &MessageKey) -> Self {
        Self {
            source: key.source.clone(),
            source_device: 0,
            relay: None,
            sent_at: key.sent_at,
            received_at: None,
            conversation_id: ConversationId::private(&key.source),
            direction: Direction::Incoming,
            body: None,
            attachments: Vec::new(),
            decrypted_at: None,
            delivered: 0,
            errors: Vec::new(),
        }
    }

    /// The composite key of this record
    pub fn key(&self) -> MessageKey {
        MessageKey {
            source: self.source.clone(),
            sent_at: self.sent_at,
        }
    }

    /// Whether this record is still a pre-decryption stub
    pub fn is_stub(&self) -> bool {
        self.body.is_none() && self.decrypted_at.is_none() && self.errors.is_empty()
    }
}

/// Field-wise merge patch for a message
///
/// `None` fields are left untouched. `errors` is the one exception to
/// replace-on-merge: entries are appended to the existing list.
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    /// Sending device
    pub source_device: Option<u32>,
    /// Forwarding hop
    pub relay: Option<String>,
    /// Local arrival time
    pub received_at: Option<DateTime<Utc>>,
    /// Conversation assignment
    pub conversation_id: Option<ConversationId>,
    /// Direction
    pub direction: Option<Direction>,
    /// Plaintext body
    pub body: Option<String>,
    /// Attachments (replaced wholesale)
    pub attachments: Option<Vec<Attachment>>,
    /// Decryption completion time
    pub decrypted_at: Option<DateTime<Utc>>,
    /// Absolute delivered count
    pub delivered: Option<u32>,
    /// Failures to append
    pub errors: Vec<DeliveryFailure>,
}

impl MessagePatch {
    /// The stub written before decryption is attempted
    pub fn stub(
        conversation_id: ConversationId,
        received_at: DateTime<Utc>,
        source_device: u32,
        relay: Option<String>,
    ) -> Self {
        Self {
            source_device: Some(source_device),
            relay,
            received_at: Some(received_at),
            conversation_id: Some(conversation_id),
            direction: Some(Direction::Incoming),
            ..Default::default()
        }
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the conversation assignment
    pub fn conversation(mut self, id: ConversationId) -> Self {
        self.conversation_id = Some(id);
        self
    }

    /// Set the attachments
    pub fn attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Set the decryption completion time
    pub fn decrypted_at(mut self, at: DateTime<Utc>) -> Self {
        self.decrypted_at = Some(at);
        self
    }

    /// Set the absolute delivered count
    pub fn delivered(mut self, count: u32) -> Self {
        self.delivered = Some(count);
        self
    }

    /// Append a failure
    pub fn error(mut self, failure: DeliveryFailure) -> Self {
        self.errors.push(failure);
        self
    }

    /// Merge this patch into an existing record
    pub fn apply(&self, message: &mut Message) {
        if let Some(source_device) = self.source_device {
            message.source_device = source_device;
        }
        if let Some(relay) = &self.relay {
            message.relay = Some(relay.clone());
        }
        if let Some(received_at) = self.received_at {
            message.received_at = Some(received_at);
        }
        if let Some(conversation_id) = &self.conversation_id {
            message.conversation_id = conversation_id.clone();
        }
        if let Some(direction) = self.direction {
            message.direction = direction;
        }
        if let Some(body) = &self.body {
            message.body = Some(body.clone());
        }
        if let Some(attachments) = &self.attachments {
            message.attachments = attachments.clone();
        }
        if let Some(decrypted_at) = self.decrypted_at {
            message.decrypted_at = Some(decrypted_at);
        }
        if let Some(delivered) = self.delivered {
            message.delivered = delivered;
        }
        message.errors.extend(self.errors.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key() -> MessageKey {
        MessageKey {
            source: Address::new("+15550100"),
            sent_at: 1_000,
        }
    }

    #[test]
    fn test_fresh_record_is_a_stub() {
        let message = Message::from_key(&key());
        assert!(message.is_stub());
        assert_eq!(message.direction, Direction::Incoming);
        assert_eq!(message.delivered, 0);
    }

    #[test]
    fn test_stub_patch_fills_arrival_fields() {
        let mut message = Message::from_key(&key());
        let now = Utc.timestamp_millis_opt(2_000).unwrap();
        let id = message.conversation_id.clone();

        MessagePatch::stub(id, now, 2, Some("relay1".to_owned())).apply(&mut message);

        assert_eq!(message.received_at, Some(now));
        assert_eq!(message.source_device, 2);
        assert_eq!(message.relay.as_deref(), Some("relay1"));
        assert!(message.is_stub());
    }

    #[test]
    fn test_enrichment_ends_stub_state() {
        let mut message = Message::from_key(&key());
        let now = Utc.timestamp_millis_opt(2_000).unwrap();

        MessagePatch::default().body("hi").decrypted_at(now).apply(&mut message);

        assert!(!message.is_stub());
        assert_eq!(message.body.as_deref(), Some("hi"));
        assert_eq!(message.decrypted_at, Some(now));
    }

    #[test]
    fn test_errors_append_rather_than_replace() {
        let mut message = Message::from_key(&key());
        let failure = DeliveryFailure::identity_changed(&Address::new("+15550100"));

        MessagePatch::default().error(failure.clone()).apply(&mut message);
        MessagePatch::default().error(failure.clone()).apply(&mut message);

        assert_eq!(message.errors.len(), 2);
        assert_eq!(message.errors[0].kind, FailureKind::IdentityChanged);
    }

    #[test]
    fn test_keys_with_same_timestamp_differ_by_source() {
        let a = MessageKey {
            source: Address::new("+15550100"),
            sent_at: 1_000,
        };
        let b = MessageKey {
            source: Address::new("+15550101"),
            sent_at: 1_000,
        };
        assert_ne!(a, b);
        assert!(a < b);
    }
}
