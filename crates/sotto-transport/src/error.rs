//! Error types for sotto-transport

use thiserror::Error;

use sotto_core::DecryptError;

/// Errors that can occur on the transport listener
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport-level wrapping could not be decrypted
    #[error("transport decrypt failed: {0}")]
    Decrypt(#[from] DecryptError),

    /// The plaintext could not be decoded into an envelope
    #[error("envelope decode failed: {0}")]
    Decode(String),

    /// An envelope could not be encoded for sending
    #[error("envelope encode failed: {0}")]
    Encode(String),

    /// The connection feed or response channel is gone
    #[error("connection closed")]
    ConnectionClosed,
}
