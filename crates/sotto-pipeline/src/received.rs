//! Fast-path bookkeeping for arrived content signals
//!
//! Runs before decryption: upsert the (assumed private) conversation,
//! write the stub message, bump the unread counter. Each step is a
//! blocking dependency of the next; decryption is entered only once both
//! records are durably written.

use std::sync::Arc;

use tracing::debug;

use sotto_core::{Clock, ConversationId, ConversationPatch, Envelope, MessagePatch};
use sotto_store::{ConversationStore, MessageStore};

use crate::decrypt::DecryptionPipeline;
use crate::error::PipelineError;
use crate::unread::UnreadTracker;

/// Handles newly arrived content signals
pub struct MessageReceivedHandler {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    unread: Arc<UnreadTracker>,
    decryption: Arc<DecryptionPipeline>,
    clock: Arc<dyn Clock>,
}

impl MessageReceivedHandler {
    /// Create a handler over the given collaborators
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        unread: Arc<UnreadTracker>,
        decryption: Arc<DecryptionPipeline>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conversations,
            messages,
            unread,
            decryption,
            clock,
        }
    }

    /// Process one content signal end to end
    ///
    /// Whether the message is really private or belongs to a group is only
    /// known after decryption; arrival bookkeeping always records a private
    /// conversation keyed by the sender, and the decryption pipeline
    /// corrects it.
    pub async fn handle(&self, envelope: Envelope) -> Result<(), PipelineError> {
        let now = self.clock.now_utc();
        debug!(source = %envelope.source, sent_at = envelope.timestamp, "Content signal arrived");

        let conversation_id = ConversationId::private(&envelope.source);
        let conversation = self
            .conversations
            .upsert(&conversation_id, ConversationPatch::private())
            .await?;

        let stub = MessagePatch::stub(
            conversation.id.clone(),
            now,
            envelope.source_device,
            envelope.relay.clone(),
        );
        self.messages.upsert(&envelope.message_key(), stub).await?;

        // Unread reflects arrival, not decryption success
        self.unread.increment().await?;

        self.decryption.process(&envelope).await
    }
}
