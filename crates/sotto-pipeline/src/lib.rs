//! # Sotto Pipeline
//!
//! Inbound signal processing for the sotto messaging client: classify each
//! decoded signal, drive content signals through pre-decryption bookkeeping
//! and decryption, correlate delivery receipts against sent messages, and
//! notify listeners.
//!
//! Control flow:
//!
//! ```text
//! MessageRouter ──(receipt)──▶ DeliveryReceiptCorrelator
//!       │
//!       └──(content)──▶ MessageReceivedHandler ──▶ DecryptionPipeline
//! ```
//!
//! Signals are processed concurrently; nothing serializes across signals.
//! Within one signal the steps are strictly sequential awaits: the stub
//! message must be durably recorded before decryption starts, and a failed
//! store write short-circuits the rest of the chain. The one shared
//! read-modify-write, the unread counter, holds a lock for its duration.

pub mod decrypt;
pub mod error;
pub mod event;
pub mod received;
pub mod receipts;
pub mod router;
pub mod unread;

pub use decrypt::{DecryptionPipeline, DEFAULT_GROUP_NAME};
pub use error::PipelineError;
pub use event::{ClientEvent, Notifier};
pub use received::MessageReceivedHandler;
pub use receipts::DeliveryReceiptCorrelator;
pub use router::MessageRouter;
pub use unread::{BadgeIndicator, NoopBadge, UnreadTracker, UNREAD_COUNT_KEY};
