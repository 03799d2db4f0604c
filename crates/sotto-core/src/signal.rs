//! Inbound signal envelope
//!
//! An [`Envelope`] is the decoded form of one transport request: routing
//! metadata plus the still-encrypted message payload. Decryption of the
//! payload happens later, in the pipeline, against the
//! [`DecryptionGateway`](crate::gateway::DecryptionGateway).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::message::MessageKey;

/// Wire code for an encrypted content message
pub const WIRE_TYPE_CIPHERTEXT: u8 = 1;

/// Wire code for a delivery receipt
pub const WIRE_TYPE_RECEIPT: u8 = 5;

/// Classification of an inbound signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// A content message to be decrypted and stored
    Content,
    /// A delivery receipt to be correlated with a sent message
    Receipt,
}

/// A decoded inbound signal
///
/// `timestamp` is assigned by the sender and, paired with `source`, forms
/// the identity of the message the signal refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender address
    pub source: Address,
    /// Sending device of the source
    pub source_device: u32,
    /// Optional forwarding hop the signal came through
    pub relay: Option<String>,
    /// Sender-assigned timestamp in milliseconds
    pub timestamp: u64,
    /// Wire-level signal type code
    pub message_type: u8,
    /// Encrypted message payload (empty for receipts)
    pub payload: Bytes,
}

impl Envelope {
    /// Classify the signal by its wire type code
    ///
    /// Only receipts get their own path; every other code, including ones
    /// this client does not know, is handled as content.
    pub fn kind(&self) -> SignalKind {
        if self.message_type == WIRE_TYPE_RECEIPT {
            SignalKind::Receipt
        } else {
            SignalKind::Content
        }
    }

    /// The key of the message this signal refers to
    pub fn message_key(&self) -> MessageKey {
        MessageKey {
            source: self.source.clone(),
            sent_at: self.timestamp,
        }
    }
}
