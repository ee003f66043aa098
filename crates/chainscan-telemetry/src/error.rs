//! Error types for telemetry operations.

use aws_sdk_cloudwatch::error::SdkError;
use aws_sdk_cloudwatch::operation::put_metric_data::PutMetricDataError;
use thiserror::Error;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Publishing buffered metric data failed.
    #[error("failed to publish metrics to namespace '{namespace}'")]
    MetricsPublish {
        /// Namespace the publish targeted.
        namespace: String,
        /// Underlying SDK error.
        source: Box<SdkError<PutMetricDataError>>,
    },
}
