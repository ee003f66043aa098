//! Decorator sink that suppresses events already seen by a unique checker.

use std::sync::Arc;

use async_trait::async_trait;
use chainscan_store::UniqueChecker;
use tracing::debug;

use crate::error::{BroadcastError, BroadcastResult};
use crate::event::ScannedEvent;
use crate::sink::EventSink;

/// Wraps another sink and forwards only first sightings. Every event's dedup
/// key is checked and marked atomically before delivery, so a replayed event
/// is dropped silently instead of being broadcast twice.
pub struct UniqueSink {
    checker: Arc<dyn UniqueChecker>,
    inner: Arc<dyn EventSink>,
}

impl UniqueSink {
    /// Wrap `inner` with first-sighting filtering through `checker`.
    #[must_use]
    pub const fn new(checker: Arc<dyn UniqueChecker>, inner: Arc<dyn EventSink>) -> Self {
        Self { checker, inner }
    }
}

#[async_trait]
impl EventSink for UniqueSink {
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()> {
        let key = event.dedup_key();
        let first_sighting = self
            .checker
            .check_and_mark(&key)
            .await
            .map_err(|source| BroadcastError::UniqueCheck { source })?;
        if first_sighting {
            self.inner.broadcast(event).await
        } else {
            debug!(dedup_key = %key, "suppressed duplicate event");
            Ok(())
        }
    }
}
