//! Seam to the cryptographic protocol engine
//!
//! The pipeline never touches key material. It hands ciphertext to a
//! [`DecryptionGateway`] and reacts to the typed outcome. The engine behind
//! the trait owns sessions, ratchets, and identity verification.

use async_trait::async_trait;
use thiserror::Error;

use crate::address::Address;
use crate::content::Content;
use crate::signal::Envelope;

/// Errors surfaced by the decryption gateway
#[derive(Debug, Clone, Error)]
pub enum DecryptError {
    /// The sender's identity key no longer matches the previously trusted
    /// one. Security-relevant, but recoverable: the user can review and
    /// accept the new identity.
    #[error("identity key changed for {address}")]
    IdentityChanged {
        /// Address whose identity changed
        address: Address,
    },

    /// Ciphertext could not be decrypted
    #[error("bad ciphertext: {0}")]
    BadCiphertext(String),

    /// Plaintext could not be decoded into content
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Trait for the external decryption engine
#[async_trait]
pub trait DecryptionGateway: Send + Sync {
    /// Decrypt the transport-level wrapping of a raw request body,
    /// yielding the plaintext signal bytes
    async fn open_transport(&self, ciphertext: &[u8]) -> Result<Vec<u8>, DecryptError>;

    /// Fully decrypt and decode the payload of a content signal
    async fn decrypt(&self, envelope: &Envelope) -> Result<Content, DecryptError>;
}
