//! # Sotto Transport
//!
//! Listener side of the persistent message connection.
//!
//! A connection driver (socket code, or an in-memory [`connection`] in
//! tests) turns inbound requests into [`SignalRequest`]s and feeds them
//! through a channel. The [`SignalListener`] owns the receiving end: it
//! unwraps the transport-level encryption, decodes the envelope,
//! acknowledges the request, and hands the decoded signal to the router.
//!
//! Acknowledgment is decoupled from processing: once decoding succeeds the
//! request is answered `200 OK` and any later failure is the client's
//! problem, not the server's. A request that cannot be decoded is answered
//! `500` and never dispatched.

pub mod codec;
pub mod connection;
pub mod error;
pub mod listener;
pub mod request;

pub use codec::{EnvelopeCodec, PostcardCodec};
pub use connection::{channel, ConnectionHandle};
pub use error::TransportError;
pub use listener::SignalListener;
pub use request::{SignalRequest, SignalResponse, SIGNAL_PATH, STATUS_ERROR, STATUS_OK};
