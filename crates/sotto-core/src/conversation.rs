//! Conversation records and merge patches
//!
//! A conversation is created the first time an inbound signal references it
//! and mutated by every signal after that. All writes go through
//! [`ConversationPatch`]: a patch creates the record if absent and merges
//! the fields it carries into an existing one, so concurrent writers can
//! only lose individual fields, never whole records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::{Address, ConversationId};

/// Whether a conversation is with a single peer or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationKind {
    /// One-to-one conversation, keyed by the peer's address
    Private,
    /// Group conversation, keyed by the group identifier
    Group,
}

/// A conversation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation key
    pub id: ConversationId,
    /// Private or group
    pub kind: ConversationKind,
    /// Display name
    pub name: Option<String>,
    /// Last activity on the conversation
    pub active_at: Option<DateTime<Utc>>,
    /// Members, tracked for group conversations only
    pub members: Vec<Address>,
}

impl Conversation {
    /// Create an empty conversation record
    pub fn new(id: ConversationId, kind: ConversationKind) -> Self {
        Self {
            id,
            kind,
            name: None,
            active_at: None,
            members: Vec::new(),
        }
    }

    /// Whether this is a group conversation
    pub fn is_group(&self) -> bool {
        self.kind == ConversationKind::Group
    }
}

/// Field-wise merge patch for a conversation
///
/// `None` fields are left untouched; `Some` fields overwrite. Last writer
/// wins per field.
#[derive(Debug, Clone, Default)]
pub struct ConversationPatch {
    /// New kind, if it should change
    pub kind: Option<ConversationKind>,
    /// New display name
    pub name: Option<String>,
    /// New last-activity timestamp
    pub active_at: Option<DateTime<Utc>>,
    /// New member list (replaced wholesale, not unioned)
    pub members: Option<Vec<Address>>,
}

impl ConversationPatch {
    /// Patch marking a conversation as private
    pub fn private() -> Self {
        Self {
            kind: Some(ConversationKind::Private),
            ..Default::default()
        }
    }

    /// Patch marking a conversation as a group
    pub fn group() -> Self {
        Self {
            kind: Some(ConversationKind::Group),
            ..Default::default()
        }
    }

    /// Set the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the last-activity timestamp
    pub fn active_at(mut self, at: DateTime<Utc>) -> Self {
        self.active_at = Some(at);
        self
    }

    /// Set the member list
    pub fn members(mut self, members: Vec<Address>) -> Self {
        self.members = Some(members);
        self
    }

    /// Merge this patch into an existing record
    pub fn apply(&self, conversation: &mut Conversation) {
        if let Some(kind) = self.kind {
            conversation.kind = kind;
        }
        if let Some(name) = &self.name {
            conversation.name = Some(name.clone());
        }
        if let Some(active_at) = self.active_at {
            conversation.active_at = Some(active_at);
        }
        if let Some(members) = &self.members {
            conversation.members = members.clone();
        }
    }
}
