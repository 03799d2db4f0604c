//! Error types for sotto-pipeline

use thiserror::Error;

use sotto_core::DecryptError;
use sotto_store::StorageError;

/// Errors that can occur while processing an inbound signal
///
/// Identity key changes never show up here: the pipeline absorbs them into
/// the target message's error list. What remains is not locally
/// recoverable and is surfaced to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A store write or read failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Decryption failed in a way this pipeline does not recover from
    #[error("decryption failed: {0}")]
    Decrypt(DecryptError),
}
