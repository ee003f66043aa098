//! SQS sink: sends each event as a message on a FIFO queue.

use async_trait::async_trait;

use crate::error::{BroadcastError, BroadcastResult};
use crate::event::ScannedEvent;
use crate::sink::EventSink;

/// Sink delivering events to an SQS queue. The event's dedup key doubles as
/// the message deduplication id so the queue drops replays on its own.
pub struct SqsSink {
    client: aws_sdk_sqs::Client,
    queue_url: String,
    message_group_id: String,
}

impl SqsSink {
    /// Construct a sink sending to `queue_url` within `message_group_id`.
    #[must_use]
    pub const fn new(
        client: aws_sdk_sqs::Client,
        queue_url: String,
        message_group_id: String,
    ) -> Self {
        Self {
            client,
            queue_url,
            message_group_id,
        }
    }

    /// The queue this sink delivers to.
    #[must_use]
    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    /// The message group id attached to every message.
    #[must_use]
    pub fn message_group_id(&self) -> &str {
        &self.message_group_id
    }
}

#[async_trait]
impl EventSink for SqsSink {
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()> {
        let body =
            serde_json::to_string(event).map_err(|source| BroadcastError::Serialize { source })?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(&self.message_group_id)
            .message_deduplication_id(event.dedup_key())
            .send()
            .await
            .map_err(|source| BroadcastError::Sqs {
                queue_url: self.queue_url.clone(),
                source: Box::new(source),
            })?;
        Ok(())
    }
}
