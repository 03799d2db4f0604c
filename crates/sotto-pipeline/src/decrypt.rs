//! Decryption orchestration
//!
//! Takes over after the fast-path bookkeeping: hands the signal to the
//! gateway, reconciles the decrypted content against conversation and
//! message state, and emits the one "message" notification per signal.
//!
//! Only after decryption does the client learn whether a message belongs
//! to a group, so the conversation written here may supersede the private
//! one created on arrival.
//!
//! Identity key changes are the single recoverable failure: they are
//! recorded on the target message and surfaced through the normal message
//! notification so the user can review the new identity. Everything else
//! propagates untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use sotto_core::{
    Clock, Content, ConversationId, ConversationPatch, DecryptError, DecryptionGateway,
    DeliveryFailure, Envelope, MessagePatch,
};
use sotto_store::{ConversationStore, MessageStore};

use crate::error::PipelineError;
use crate::event::Notifier;

/// Name given to a group conversation whose context carried none
pub const DEFAULT_GROUP_NAME: &str = "New group";

/// Orchestrates decryption, state enrichment, and notification
pub struct DecryptionPipeline {
    gateway: Arc<dyn DecryptionGateway>,
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    default_group_name: String,
}

impl DecryptionPipeline {
    /// Create a pipeline over the given collaborators
    pub fn new(
        gateway: Arc<dyn DecryptionGateway>,
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            conversations,
            messages,
            notifier,
            clock,
            default_group_name: DEFAULT_GROUP_NAME.to_owned(),
        }
    }

    /// Override the placeholder name for nameless groups
    pub fn with_default_group_name(mut self, name: impl Into<String>) -> Self {
        self.default_group_name = name.into();
        self
    }

    /// Decrypt a content signal and reconcile the outcome into local state
    ///
    /// The caller must have persisted the stub message for this signal
    /// already; the identity-change path merges into that stub.
    pub async fn process(&self, envelope: &Envelope) -> Result<(), PipelineError> {
        match self.gateway.decrypt(envelope).await {
            Ok(content) => self.apply_content(envelope, content).await,
            Err(DecryptError::IdentityChanged { address }) => {
                self.record_identity_change(envelope, &address).await
            }
            Err(error) => Err(PipelineError::Decrypt(error)),
        }
    }

    /// Normal path: enrich conversation and message, then notify
    async fn apply_content(&self, envelope: &Envelope, content: Content) -> Result<(), PipelineError> {
        let now = self.clock.now_utc();
        let (conversation_id, patch) = self.conversation_attributes(envelope, &content, now);

        self.conversations.upsert(&conversation_id, patch).await?;

        let message_patch = MessagePatch {
            body: content.body,
            attachments: Some(content.attachments),
            conversation_id: Some(conversation_id.clone()),
            decrypted_at: Some(now),
            ..Default::default()
        };
        let message = self
            .messages
            .upsert(&envelope.message_key(), message_patch)
            .await?;

        debug!(
            source = %envelope.source,
            sent_at = envelope.timestamp,
            conversation = %conversation_id,
            "Message decrypted"
        );
        self.notifier.message(message);
        Ok(())
    }

    /// Conversation attributes derived from decrypted content: the group
    /// context wins over the sender address
    fn conversation_attributes(
        &self,
        envelope: &Envelope,
        content: &Content,
        now: DateTime<Utc>,
    ) -> (ConversationId, ConversationPatch) {
        match &content.group {
            Some(group) => {
                let name = group
                    .name
                    .clone()
                    .unwrap_or_else(|| self.default_group_name.clone());
                let mut patch = ConversationPatch::group().name(name).active_at(now);
                if !group.members.is_empty() {
                    patch = patch.members(group.members.clone());
                }
                (ConversationId::group(&group.id), patch)
            }
            None => (
                ConversationId::private(&envelope.source),
                ConversationPatch::private()
                    .name(envelope.source.as_str())
                    .active_at(now),
            ),
        }
    }

    /// Recovery path: record the identity change on the message and notify
    async fn record_identity_change(
        &self,
        envelope: &Envelope,
        address: &sotto_core::Address,
    ) -> Result<(), PipelineError> {
        warn!(source = %address, sent_at = envelope.timestamp, "Identity key changed");

        let patch = MessagePatch::default().error(DeliveryFailure::identity_changed(address));
        let message = self
            .messages
            .upsert(&envelope.message_key(), patch)
            .await?;

        self.notifier.message(message);
        Ok(())
    }
}
