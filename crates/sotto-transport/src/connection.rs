//! In-memory persistent connection
//!
//! Models the request side of the persistent connection as an mpsc feed of
//! [`SignalRequest`]s. Production drivers wrap a socket and push decoded
//! frames into the same channel; tests and simulations use
//! [`ConnectionHandle`] to play the server.

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::request::{SignalRequest, SignalResponse};

/// Create a connection feed with the given in-flight capacity
///
/// Returns the server-side handle and the receiver the listener consumes.
pub fn channel(capacity: usize) -> (ConnectionHandle, mpsc::Receiver<SignalRequest>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ConnectionHandle { tx }, rx)
}

/// Server-side handle of an in-memory connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    tx: mpsc::Sender<SignalRequest>,
}

impl ConnectionHandle {
    /// Push a `PUT /messages` request and wait for its response
    pub async fn put_messages(&self, body: Bytes) -> Result<SignalResponse, TransportError> {
        let (request, response_rx) = SignalRequest::put_messages(body);
        self.tx
            .send(request)
            .await
            .map_err(|_| TransportError::ConnectionClosed)?;
        response_rx.await.map_err(|_| TransportError::ConnectionClosed)
    }

    /// Push an arbitrary request and wait for its response
    pub async fn request(
        &self,
        verb: impl Into<String>,
        path: impl Into<String>,
        body: Bytes,
    ) -> Result<SignalResponse, TransportError> {
        let (request, response_rx) = SignalRequest::new(verb, path, body);
        self.tx
            .send(request)
            .await
            .map_err(|_| TransportError::ConnectionClosed)?;
        response_rx.await.map_err(|_| TransportError::ConnectionClosed)
    }
}
