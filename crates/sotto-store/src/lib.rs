//! # Sotto Store
//!
//! Store traits and in-memory implementations for the sotto messaging
//! client.
//!
//! The ingestion pipeline treats persistence as an injected collaborator:
//! everything it writes goes through the merge-upsert operations defined
//! here. A merge-upsert creates the record if absent, otherwise merges the
//! patch into it field by field; it never replaces a record wholesale. The
//! per-key upsert is the atomicity boundary the pipeline relies on.
//!
//! The in-memory implementations in [`memory`] are complete and suitable
//! for tests and short-lived sessions; a durable backend implements the
//! same traits.

pub mod error;
pub mod memory;

pub use error::StorageError;
pub use memory::{InMemoryConversationStore, InMemoryCounterStore, InMemoryMessageStore};

use async_trait::async_trait;

use sotto_core::{
    Address, Conversation, ConversationId, ConversationPatch, Message, MessageKey, MessagePatch,
};

/// Keyed store of conversation records
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create-or-merge the conversation `id`
    ///
    /// Returns the record as it stands after the merge.
    async fn upsert(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<Conversation, StorageError>;

    /// Fetch a conversation by id
    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, StorageError>;

    /// Ids of all group conversations that `member` participates in
    async fn groups_with_member(
        &self,
        member: &Address,
    ) -> Result<Vec<ConversationId>, StorageError>;
}

/// Keyed store of message records with a `sent_at` index
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Create-or-merge the message at `key`
    ///
    /// Returns the record as it stands after the merge.
    async fn upsert(&self, key: &MessageKey, patch: MessagePatch) -> Result<Message, StorageError>;

    /// Fetch a message by its composite key
    async fn get(&self, key: &MessageKey) -> Result<Option<Message>, StorageError>;

    /// All messages whose `sent_at` equals `sent_at` exactly, in store
    /// iteration order
    async fn by_sent_at(&self, sent_at: u64) -> Result<Vec<Message>, StorageError>;
}

/// Persisted named counters
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read a counter, `None` if it was never written
    async fn get(&self, key: &str) -> Result<Option<u64>, StorageError>;

    /// Write a counter
    async fn put(&self, key: &str, value: u64) -> Result<(), StorageError>;
}
