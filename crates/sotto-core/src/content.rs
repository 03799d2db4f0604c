//! Decrypted content of an inbound signal
//!
//! Produced by the [`DecryptionGateway`](crate::gateway::DecryptionGateway)
//! once a content signal has been decrypted and decoded.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::address::{Address, GroupId};

/// An attachment carried by a decrypted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type of the attachment
    pub content_type: String,
    /// Attachment bytes
    pub data: Bytes,
}

/// Group context carried by a decrypted message, when the message was
/// addressed to a group rather than to us directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupContext {
    /// Group identifier
    pub id: GroupId,
    /// Group display name, if the sender included one
    pub name: Option<String>,
    /// Known members of the group
    pub members: Vec<Address>,
}

/// The decrypted payload of a content signal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Message body
    pub body: Option<String>,
    /// Attachments, possibly empty
    pub attachments: Vec<Attachment>,
    /// Present when the message belongs to a group conversation
    pub group: Option<GroupContext>,
}

impl Content {
    /// Create plain text content
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Attach a group context
    pub fn with_group(mut self, group: GroupContext) -> Self {
        self.group = Some(group);
        self
    }
}
