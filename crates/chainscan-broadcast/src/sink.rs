//! The sink seam every broadcaster implements.

use async_trait::async_trait;

use crate::error::BroadcastResult;
use crate::event::ScannedEvent;

/// Publishes one scanned event to an external channel.
///
/// `broadcast` resolves once the event has been delivered or durably queued.
/// Transport-level retry and backoff are the responsibility of each sink's
/// underlying client, never of callers.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns an error when the event could not be delivered or queued.
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()>;
}
