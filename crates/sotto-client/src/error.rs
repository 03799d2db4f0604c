//! Error types for the client coordinator

use thiserror::Error;

/// Errors that can occur building or running a [`Client`](crate::Client)
#[derive(Debug, Error)]
pub enum ClientError {
    /// The account is not registered yet; the listener will not start
    #[error("registration is not done")]
    NotRegistered,

    /// A required collaborator was not provided
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Storage error during startup
    #[error("storage error: {0}")]
    Storage(#[from] sotto_store::StorageError),
}
