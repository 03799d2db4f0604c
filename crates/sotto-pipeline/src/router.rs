//! Signal classification and dispatch

use sotto_core::{Envelope, SignalKind};

use crate::error::PipelineError;
use crate::receipts::DeliveryReceiptCorrelator;
use crate::received::MessageReceivedHandler;

/// Dispatches decoded signals to the receipt or content path
///
/// Pure dispatch: receipts go to the correlator, everything else to the
/// received-handler. No other classification happens at this layer.
pub struct MessageRouter {
    received: MessageReceivedHandler,
    receipts: DeliveryReceiptCorrelator,
}

impl MessageRouter {
    /// Create a router over the two handlers
    pub fn new(received: MessageReceivedHandler, receipts: DeliveryReceiptCorrelator) -> Self {
        Self { received, receipts }
    }

    /// Route one decoded signal
    pub async fn route(&self, envelope: Envelope) -> Result<(), PipelineError> {
        match envelope.kind() {
            SignalKind::Receipt => self.receipts.correlate(&envelope).await,
            SignalKind::Content => self.received.handle(envelope).await,
        }
    }
}
