//! Transport listener
//!
//! Consumes the request feed of the persistent connection. Each request is
//! unwrapped (transport decrypt), decoded into an envelope, acknowledged,
//! and routed — in that order. The acknowledgment never waits on routing:
//! application-level processing runs on its own task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use sotto_core::{DecryptionGateway, Envelope};
use sotto_pipeline::{MessageRouter, Notifier};

use crate::codec::EnvelopeCodec;
use crate::error::TransportError;
use crate::request::{SignalRequest, SignalResponse};

/// Listens on the persistent connection and feeds the router
pub struct SignalListener {
    gateway: Arc<dyn DecryptionGateway>,
    codec: Arc<dyn EnvelopeCodec>,
    router: Arc<MessageRouter>,
    notifier: Notifier,
}

impl SignalListener {
    /// Create a listener over the given collaborators
    pub fn new(
        gateway: Arc<dyn DecryptionGateway>,
        codec: Arc<dyn EnvelopeCodec>,
        router: Arc<MessageRouter>,
        notifier: Notifier,
    ) -> Self {
        Self {
            gateway,
            codec,
            router,
            notifier,
        }
    }

    /// Spawn the listener loop over a request feed
    ///
    /// The loop ends when the feed closes; in-flight routing tasks run to
    /// completion on their own.
    pub fn spawn(self, requests: mpsc::Receiver<SignalRequest>) -> JoinHandle<()> {
        tokio::spawn(self.run(requests))
    }

    async fn run(self, mut requests: mpsc::Receiver<SignalRequest>) {
        info!("Listening for message pushes");
        while let Some(request) = requests.recv().await {
            self.handle_request(request).await;
        }
        info!("Connection feed closed, listener exiting");
    }

    /// Decode, acknowledge, dispatch — exactly one response per request,
    /// always sent before routing begins
    async fn handle_request(&self, request: SignalRequest) {
        // TODO: handle request types other than PUT /messages
        match self.decode(&request).await {
            Ok(envelope) => {
                // Decoding succeeded, so remaining failures are ours, not
                // the server's: acknowledge now, process afterwards.
                request.respond(SignalResponse::ok());

                let router = self.router.clone();
                tokio::spawn(async move {
                    if let Err(e) = router.route(envelope).await {
                        error!(error = %e, "Error handling incoming message");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "Rejecting undecodable message push");
                self.notifier.transport_error(e.to_string());
                request.respond(SignalResponse::bad_message());
            }
        }
    }

    async fn decode(&self, request: &SignalRequest) -> Result<Envelope, TransportError> {
        let plaintext = self.gateway.open_transport(&request.body).await?;
        let envelope = self.codec.decode(&plaintext)?;
        debug!(
            source = %envelope.source,
            sent_at = envelope.timestamp,
            message_type = envelope.message_type,
            "Decoded inbound signal"
        );
        Ok(envelope)
    }
}
