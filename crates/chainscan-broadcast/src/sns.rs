//! SNS sink: publishes each event to a FIFO topic.

use async_trait::async_trait;

use crate::error::{BroadcastError, BroadcastResult};
use crate::event::ScannedEvent;
use crate::sink::EventSink;

/// Sink publishing events to an SNS topic, with the event's dedup key used
/// as the message deduplication id.
pub struct SnsSink {
    client: aws_sdk_sns::Client,
    topic_arn: String,
    message_group_id: String,
}

impl SnsSink {
    /// Construct a sink publishing to `topic_arn` within `message_group_id`.
    #[must_use]
    pub const fn new(
        client: aws_sdk_sns::Client,
        topic_arn: String,
        message_group_id: String,
    ) -> Self {
        Self {
            client,
            topic_arn,
            message_group_id,
        }
    }

    /// The topic this sink publishes to.
    #[must_use]
    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }

    /// The message group id attached to every publish.
    #[must_use]
    pub fn message_group_id(&self) -> &str {
        &self.message_group_id
    }
}

#[async_trait]
impl EventSink for SnsSink {
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()> {
        let message =
            serde_json::to_string(event).map_err(|source| BroadcastError::Serialize { source })?;
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .message_group_id(&self.message_group_id)
            .message_deduplication_id(event.dedup_key())
            .send()
            .await
            .map_err(|source| BroadcastError::Sns {
                topic_arn: self.topic_arn.clone(),
                source: Box::new(source),
            })?;
        Ok(())
    }
}
