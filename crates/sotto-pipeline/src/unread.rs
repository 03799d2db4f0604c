//! Unread counter and badge mirroring
//!
//! The unread count reflects message arrival, not decryption success: it is
//! bumped once per inbound content signal, before decryption is attempted.
//! The increment is the one read-modify-write against shared persisted
//! state in this crate, so it runs under a lock; without one, concurrent
//! signals could lose increments.
//!
//! Persisting the counter and notifying the indicator are two separate
//! steps with the same two observable effects: the stored value and the
//! badge both show the new count.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use sotto_store::{CounterStore, StorageError};

/// Persisted key of the unread-message counter
pub const UNREAD_COUNT_KEY: &str = "unread_count";

/// Visible indicator mirroring the unread count (badge, tray icon, ...)
#[async_trait]
pub trait BadgeIndicator: Send + Sync {
    /// Show the new unread count
    async fn set_unread(&self, count: u64);
}

/// Indicator that ignores updates, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBadge;

#[async_trait]
impl BadgeIndicator for NoopBadge {
    async fn set_unread(&self, _count: u64) {}
}

/// Tracks the persisted unread counter and mirrors it to an indicator
pub struct UnreadTracker {
    counters: Arc<dyn CounterStore>,
    badge: Arc<dyn BadgeIndicator>,
    // Serializes the read-modify-write on the counter
    increment_lock: Mutex<()>,
}

impl UnreadTracker {
    /// Create a tracker over the given counter store and indicator
    pub fn new(counters: Arc<dyn CounterStore>, badge: Arc<dyn BadgeIndicator>) -> Self {
        Self {
            counters,
            badge,
            increment_lock: Mutex::new(()),
        }
    }

    /// Increment the unread counter by one and push the new value to the
    /// indicator
    ///
    /// Returns the new count.
    pub async fn increment(&self) -> Result<u64, StorageError> {
        let _guard = self.increment_lock.lock().await;

        let current = self.counters.get(UNREAD_COUNT_KEY).await?.unwrap_or(0);
        let next = current + 1;
        self.counters.put(UNREAD_COUNT_KEY, next).await?;
        debug!(unread = next, "Unread count incremented");

        self.badge.set_unread(next).await;
        Ok(next)
    }

    /// Read the current unread count
    pub async fn current(&self) -> Result<u64, StorageError> {
        Ok(self.counters.get(UNREAD_COUNT_KEY).await?.unwrap_or(0))
    }
}
