//! # Sotto Core
//!
//! Core types, trait seams, and errors for the sotto messaging client.
//!
//! This crate defines the domain model shared by the ingestion pipeline and
//! its collaborators:
//!
//! ## Key Types
//!
//! - [`Envelope`]: a decoded inbound signal (content or delivery receipt)
//! - [`Conversation`] / [`ConversationPatch`]: conversation records and
//!   field-wise merge patches
//! - [`Message`] / [`MessagePatch`]: message records, keyed by
//!   `(source, sent_at)`, and their merge patches
//! - [`Content`]: the decrypted payload of a content signal
//!
//! ## Key Traits
//!
//! - [`DecryptionGateway`]: seam to the cryptographic protocol engine
//! - [`Clock`]: time abstraction for testability

pub mod address;
pub mod clock;
pub mod content;
pub mod conversation;
pub mod gateway;
pub mod message;
pub mod signal;

// Re-export main types
pub use address::*;
pub use clock::*;
pub use content::*;
pub use conversation::*;
pub use gateway::*;
pub use message::*;
pub use signal::*;
