//! Fan-out sink delivering each event to every configured destination.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{BroadcastError, BroadcastResult};
use crate::event::ScannedEvent;
use crate::sink::EventSink;

/// Delivers each event to every inner sink in order. A failure in one sink
/// never prevents delivery to the others; if any sink fails the whole
/// broadcast reports how many deliveries succeeded.
pub struct MulticastSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl MulticastSink {
    /// Construct a fan-out over `sinks`, preserving their order.
    #[must_use]
    pub const fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    /// Number of inner sinks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether the fan-out has no inner sinks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for MulticastSink {
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()> {
        let mut delivered = 0;
        for (index, sink) in self.sinks.iter().enumerate() {
            match sink.broadcast(event).await {
                Ok(()) => delivered += 1,
                Err(error) => {
                    warn!(sink = index, %error, "multicast delivery failed");
                }
            }
        }
        if delivered == self.sinks.len() {
            Ok(())
        } else {
            Err(BroadcastError::Multicast {
                delivered,
                total: self.sinks.len(),
            })
        }
    }
}
