//! Envelope wire codec
//!
//! Decoding the plaintext of a transport request into an [`Envelope`] is a
//! collaborator concern; [`PostcardCodec`] is the default wire format used
//! by this client and its tests.

use sotto_core::Envelope;

use crate::error::TransportError;

/// Trait for the envelope wire format
pub trait EnvelopeCodec: Send + Sync {
    /// Decode plaintext signal bytes into an envelope
    fn decode(&self, plaintext: &[u8]) -> Result<Envelope, TransportError>;

    /// Encode an envelope to its wire form
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, TransportError>;
}

/// Postcard-based envelope codec
#[derive(Debug, Clone, Copy, Default)]
pub struct PostcardCodec;

impl EnvelopeCodec for PostcardCodec {
    fn decode(&self, plaintext: &[u8]) -> Result<Envelope, TransportError> {
        postcard::from_bytes(plaintext).map_err(|e| TransportError::Decode(e.to_string()))
    }

    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, TransportError> {
        postcard::to_allocvec(envelope).map_err(|e| TransportError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use sotto_core::{Address, WIRE_TYPE_CIPHERTEXT};

    #[test]
    fn test_envelope_roundtrip() {
        let codec = PostcardCodec;
        let envelope = Envelope {
            source: Address::new("+15550100"),
            source_device: 2,
            relay: Some("relay1".to_owned()),
            timestamp: 1_000,
            message_type: WIRE_TYPE_CIPHERTEXT,
            payload: Bytes::from_static(b"ciphertext"),
        };

        let wire = codec.encode(&envelope).unwrap();
        let decoded = codec.decode(&wire).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let codec = PostcardCodec;
        assert!(matches!(
            codec.decode(&[0xff; 3]),
            Err(TransportError::Decode(_))
        ));
    }
}
