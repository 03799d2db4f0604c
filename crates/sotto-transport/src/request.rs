//! Request and response types for the persistent connection
//!
//! The server pushes requests over the connection and expects exactly one
//! response each. [`SignalRequest::respond`] consumes the request, so a
//! second response is unrepresentable.

use bytes::Bytes;
use tokio::sync::oneshot;

/// Status code of a successfully decoded request
pub const STATUS_OK: u16 = 200;

/// Status code of a request that could not be decoded
pub const STATUS_ERROR: u16 = 500;

/// Path message pushes arrive on
pub const SIGNAL_PATH: &str = "/messages";

/// Response sent back over the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalResponse {
    /// Status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl SignalResponse {
    /// Acknowledgment of a decoded request
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK,
            body: "OK".to_owned(),
        }
    }

    /// Rejection of an undecodable request
    pub fn bad_message() -> Self {
        Self {
            status: STATUS_ERROR,
            body: "Bad encrypted websocket message".to_owned(),
        }
    }

    /// Whether this is an acknowledgment
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// One inbound request from the server
#[derive(Debug)]
pub struct SignalRequest {
    /// Request verb, `PUT` for message pushes
    pub verb: String,
    /// Request path, [`SIGNAL_PATH`] for message pushes
    pub path: String,
    /// Opaque encrypted signal envelope
    pub body: Bytes,
    responder: oneshot::Sender<SignalResponse>,
}

impl SignalRequest {
    /// Create a request and the handle its response arrives on
    pub fn new(
        verb: impl Into<String>,
        path: impl Into<String>,
        body: Bytes,
    ) -> (Self, oneshot::Receiver<SignalResponse>) {
        let (responder, response_rx) = oneshot::channel();
        (
            Self {
                verb: verb.into(),
                path: path.into(),
                body,
                responder,
            },
            response_rx,
        )
    }

    /// Create a `PUT /messages` request
    pub fn put_messages(body: Bytes) -> (Self, oneshot::Receiver<SignalResponse>) {
        Self::new("PUT", SIGNAL_PATH, body)
    }

    /// Answer the request, consuming it
    ///
    /// The send result is ignored: a driver that stopped caring about the
    /// response does not stall the listener.
    pub fn respond(self, response: SignalResponse) {
        let _ = self.responder.send(response);
    }
}
