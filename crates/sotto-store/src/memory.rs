//! In-memory storage implementations
//!
//! This module provides in-memory implementations of the store traits,
//! suitable for testing and short-lived sessions.
//!
//! Message records live in a `BTreeMap` keyed by `(source, sent_at)` with a
//! secondary index on `sent_at`, so index lookups come back in a
//! deterministic iteration order. Conversations use `DashMap`; the entry
//! guard makes each upsert atomic per key.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use sotto_core::{
    Address, Conversation, ConversationId, ConversationKind, ConversationPatch, Message,
    MessageKey, MessagePatch,
};

use crate::error::StorageError;
use crate::{ConversationStore, CounterStore, MessageStore};

/// In-memory implementation of [`ConversationStore`]
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: DashMap<ConversationId, Conversation>,
}

impl InMemoryConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversations held
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn upsert(
        &self,
        id: &ConversationId,
        patch: ConversationPatch,
    ) -> Result<Conversation, StorageError> {
        trace!(conversation = %id, "Upserting conversation");

        let mut entry = self
            .conversations
            .entry(id.clone())
            .or_insert_with(|| Conversation::new(id.clone(), ConversationKind::Private));
        patch.apply(entry.value_mut());
        Ok(entry.value().clone())
    }

    async fn get(&self, id: &ConversationId) -> Result<Option<Conversation>, StorageError> {
        Ok(self.conversations.get(id).map(|c| c.value().clone()))
    }

    async fn groups_with_member(
        &self,
        member: &Address,
    ) -> Result<Vec<ConversationId>, StorageError> {
        let mut ids: Vec<ConversationId> = self
            .conversations
            .iter()
            .filter(|entry| entry.value().is_group() && entry.value().members.contains(member))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// In-memory implementation of [`MessageStore`]
///
/// The primary map is ordered by `(source, sent_at)`; the `sent_at` index
/// keeps the keys of every message sharing a timestamp, in that same order.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<BTreeMap<MessageKey, Message>>,
    sent_at_index: RwLock<BTreeMap<u64, BTreeSet<MessageKey>>>,
}

impl InMemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages held
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .map(|messages| messages.len())
            .unwrap_or(0)
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn upsert(&self, key: &MessageKey, patch: MessagePatch) -> Result<Message, StorageError> {
        trace!(source = %key.source, sent_at = key.sent_at, "Upserting message");

        let merged = {
            let mut messages = self
                .messages
                .write()
                .map_err(|_| StorageError::lock_poisoned("message map"))?;
            let message = messages
                .entry(key.clone())
                .or_insert_with(|| Message::from_key(key));
            patch.apply(message);
            message.clone()
        };

        let mut index = self
            .sent_at_index
            .write()
            .map_err(|_| StorageError::lock_poisoned("sent_at index"))?;
        index.entry(key.sent_at).or_default().insert(key.clone());

        Ok(merged)
    }

    async fn get(&self, key: &MessageKey) -> Result<Option<Message>, StorageError> {
        let messages = self
            .messages
            .read()
            .map_err(|_| StorageError::lock_poisoned("message map"))?;
        Ok(messages.get(key).cloned())
    }

    async fn by_sent_at(&self, sent_at: u64) -> Result<Vec<Message>, StorageError> {
        let index = self
            .sent_at_index
            .read()
            .map_err(|_| StorageError::lock_poisoned("sent_at index"))?;
        let Some(keys) = index.get(&sent_at) else {
            return Ok(Vec::new());
        };

        let messages = self
            .messages
            .read()
            .map_err(|_| StorageError::lock_poisoned("message map"))?;
        Ok(keys
            .iter()
            .filter_map(|key| messages.get(key).cloned())
            .collect())
    }
}

/// In-memory implementation of [`CounterStore`]
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: DashMap<String, u64>,
}

impl InMemoryCounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<u64>, StorageError> {
        Ok(self.counters.get(key).map(|v| *v.value()))
    }

    async fn put(&self, key: &str, value: u64) -> Result<(), StorageError> {
        self.counters.insert(key.to_owned(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sotto_core::Direction;

    fn key(source: &str, sent_at: u64) -> MessageKey {
        MessageKey {
            source: Address::new(source),
            sent_at,
        }
    }

    #[tokio::test]
    async fn test_conversation_upsert_is_idempotent() {
        let store = InMemoryConversationStore::new();
        let id = ConversationId::private(&Address::new("+15550100"));

        store.upsert(&id, ConversationPatch::private()).await.unwrap();
        store.upsert(&id, ConversationPatch::private()).await.unwrap();

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_conversation_upsert_merges_fields() {
        let store = InMemoryConversationStore::new();
        let id = ConversationId::private(&Address::new("+15550100"));
        let at = Utc.timestamp_millis_opt(5_000).unwrap();

        store
            .upsert(&id, ConversationPatch::private().name("Alice"))
            .await
            .unwrap();
        let merged = store
            .upsert(&id, ConversationPatch::default().active_at(at))
            .await
            .unwrap();

        assert_eq!(merged.name.as_deref(), Some("Alice"));
        assert_eq!(merged.active_at, Some(at));
    }

    #[tokio::test]
    async fn test_groups_with_member_skips_private_and_foreign() {
        let store = InMemoryConversationStore::new();
        let alice = Address::new("+15550100");

        store
            .upsert(
                &ConversationId::group(&"g1".into()),
                ConversationPatch::group().members(vec![alice.clone()]),
            )
            .await
            .unwrap();
        store
            .upsert(
                &ConversationId::group(&"g2".into()),
                ConversationPatch::group().members(vec![Address::new("+15550199")]),
            )
            .await
            .unwrap();
        store
            .upsert(&ConversationId::private(&alice), ConversationPatch::private())
            .await
            .unwrap();

        let groups = store.groups_with_member(&alice).await.unwrap();
        assert_eq!(groups, vec![ConversationId::group(&"g1".into())]);
    }

    #[tokio::test]
    async fn test_message_upsert_creates_then_merges() {
        let store = InMemoryMessageStore::new();
        let key = key("+15550100", 1_000);

        let stub = store.upsert(&key, MessagePatch::default()).await.unwrap();
        assert!(stub.is_stub());

        let enriched = store
            .upsert(&key, MessagePatch::default().body("hi"))
            .await
            .unwrap();
        assert_eq!(enriched.body.as_deref(), Some("hi"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_by_sent_at_is_exact_and_ordered() {
        let store = InMemoryMessageStore::new();

        for source in ["+15550102", "+15550100", "+15550101"] {
            store
                .upsert(&key(source, 1_000), MessagePatch::default())
                .await
                .unwrap();
        }
        store
            .upsert(&key("+15550100", 2_000), MessagePatch::default())
            .await
            .unwrap();

        let hits = store.by_sent_at(1_000).await.unwrap();
        let sources: Vec<&str> = hits.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(sources, vec!["+15550100", "+15550101", "+15550102"]);

        assert!(store.by_sent_at(3_000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_timestamp_different_sources_are_distinct() {
        let store = InMemoryMessageStore::new();

        store
            .upsert(
                &key("+15550100", 1_000),
                MessagePatch::default().body("from alice"),
            )
            .await
            .unwrap();
        store
            .upsert(
                &key("+15550101", 1_000),
                MessagePatch::default().body("from bob"),
            )
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        let alice = store.get(&key("+15550100", 1_000)).await.unwrap().unwrap();
        assert_eq!(alice.body.as_deref(), Some("from alice"));
    }

    #[tokio::test]
    async fn test_delivered_direction_roundtrip() {
        let store = InMemoryMessageStore::new();
        let key = key("+15550100", 1_000);

        store
            .upsert(
                &key,
                MessagePatch {
                    direction: Some(Direction::Outgoing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let updated = store
            .upsert(&key, MessagePatch::default().delivered(1))
            .await
            .unwrap();

        assert_eq!(updated.direction, Direction::Outgoing);
        assert_eq!(updated.delivered, 1);
    }

    #[tokio::test]
    async fn test_counter_defaults_to_absent() {
        let store = InMemoryCounterStore::new();
        assert_eq!(store.get("unread_count").await.unwrap(), None);

        store.put("unread_count", 3).await.unwrap();
        assert_eq!(store.get("unread_count").await.unwrap(), Some(3));
    }
}
