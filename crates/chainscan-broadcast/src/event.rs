//! Event model shared by every sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event detected by the scanning engine, as handed to the assembled
/// broadcaster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScannedEvent {
    /// Fully qualified event-type name.
    pub event_type: String,
    /// Height of the block containing the event.
    pub block_height: u64,
    /// Identifier of the block containing the event.
    pub block_id: String,
    /// Identifier of the transaction that emitted the event.
    pub transaction_id: String,
    /// Index of the transaction within its block.
    pub transaction_index: u32,
    /// Index of the event within its transaction.
    pub event_index: u32,
    /// Decoded event payload.
    pub payload: Value,
    /// Instant the scanner observed the event.
    pub observed_at: DateTime<Utc>,
}

impl ScannedEvent {
    /// Stable key identifying this event for dedup purposes. Two sightings
    /// of the same on-chain event always produce the same key.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.event_type, self.transaction_id, self.event_index
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_event(event_index: u32) -> ScannedEvent {
    ScannedEvent {
        event_type: "A.1234.Market.Listed".to_string(),
        block_height: 120,
        block_id: "b0".to_string(),
        transaction_id: "t9".to_string(),
        transaction_index: 0,
        event_index,
        payload: serde_json::json!({ "price": "10.0" }),
        observed_at: Utc::now(),
    }
}
