//! Error types for broadcast operations.

use aws_sdk_sns::operation::publish::PublishError;
use aws_sdk_sqs::operation::send_message::SendMessageError;
use thiserror::Error;

/// Result alias for broadcast operations.
pub type BroadcastResult<T> = Result<T, BroadcastError>;

/// Errors raised while constructing sinks or delivering events.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// Serialising the event payload failed.
    #[error("failed to serialize event")]
    Serialize {
        /// Source serialisation error.
        source: serde_json::Error,
    },
    /// Building the HTTP client failed.
    #[error("failed to build http client")]
    HttpClient {
        /// Source client error.
        source: reqwest::Error,
    },
    /// An HTTP delivery failed before a response arrived.
    #[error("http delivery to '{endpoint}' failed")]
    HttpDelivery {
        /// Delivery endpoint.
        endpoint: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// An HTTP delivery returned a non-success status.
    #[error("http delivery to '{endpoint}' returned status {status}")]
    HttpStatus {
        /// Delivery endpoint.
        endpoint: String,
        /// HTTP status code returned by the receiver.
        status: u16,
    },
    /// A queue delivery failed.
    #[error("sqs delivery to '{queue_url}' failed")]
    Sqs {
        /// Target queue URL.
        queue_url: String,
        /// Source SDK error.
        source: Box<aws_sdk_sqs::error::SdkError<SendMessageError>>,
    },
    /// A topic delivery failed.
    #[error("sns delivery to '{topic_arn}' failed")]
    Sns {
        /// Target topic ARN.
        topic_arn: String,
        /// Source SDK error.
        source: Box<aws_sdk_sns::error::SdkError<PublishError>>,
    },
    /// The dedup filter's backing store failed.
    #[error("unique check failed")]
    UniqueCheck {
        /// Source store error.
        source: chainscan_store::StoreError,
    },
    /// One or more sinks in a multicast fan-out failed.
    #[error("multicast delivered to {delivered} of {total} sinks")]
    Multicast {
        /// Sinks that accepted the event.
        delivered: usize,
        /// Total sinks in the fan-out.
        total: usize,
    },
}
