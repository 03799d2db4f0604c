//! Delivery-receipt correlation
//!
//! A receipt carries only `(source, timestamp)`. Correlation searches the
//! `sent_at` index for outgoing messages at that exact timestamp, then
//! credits the first one whose conversation is either the private
//! conversation with the receipt's source or a group the source is a
//! member of.
//!
//! A single receipt credits at most one message, even when several
//! outgoing messages share the timestamp and conversation: the scan stops
//! at the first match. Whether multiple simultaneous deliveries should
//! each be credited is an open product question; until that is answered
//! the single-credit behavior stands and is pinned by tests.

use std::sync::Arc;

use tracing::debug;

use sotto_core::{ConversationId, Direction, Envelope, MessagePatch};
use sotto_store::{ConversationStore, MessageStore};

use crate::error::PipelineError;

/// Matches delivery receipts to previously sent messages
pub struct DeliveryReceiptCorrelator {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
}

impl DeliveryReceiptCorrelator {
    /// Create a correlator over the given stores
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// Correlate one receipt signal
    ///
    /// A receipt that matches nothing is a no-op, not an error: the log
    /// line is all that remains of it.
    pub async fn correlate(&self, envelope: &Envelope) -> Result<(), PipelineError> {
        debug!(source = %envelope.source, sent_at = envelope.timestamp, "Delivery receipt");

        let candidates = self.messages.by_sent_at(envelope.timestamp).await?;
        let group_ids = self
            .conversations
            .groups_with_member(&envelope.source)
            .await?;
        let private_id = ConversationId::private(&envelope.source);

        for message in candidates
            .iter()
            .filter(|m| m.direction == Direction::Outgoing)
        {
            if message.conversation_id == private_id
                || group_ids.contains(&message.conversation_id)
            {
                let patch = MessagePatch::default().delivered(message.delivered + 1);
                self.messages.upsert(&message.key(), patch).await?;
                return Ok(());
            }
        }

        debug!(
            source = %envelope.source,
            sent_at = envelope.timestamp,
            "Delivery receipt for unknown message"
        );
        Ok(())
    }
}
