//! Console sink: writes every event to the operator log.

use async_trait::async_trait;
use tracing::info;

use crate::error::{BroadcastError, BroadcastResult};
use crate::event::ScannedEvent;
use crate::sink::EventSink;

/// Fallback sink used when no broadcaster is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Construct the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|source| BroadcastError::Serialize { source })?;
        info!(
            event_type = %event.event_type,
            block_height = event.block_height,
            transaction_id = %event.transaction_id,
            event_index = event.event_index,
            payload = %payload,
            "scanned event"
        );
        Ok(())
    }
}
