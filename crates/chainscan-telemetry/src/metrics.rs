//! Metrics sink seam and the CloudWatch implementation.
//!
//! # Design
//! - Recording is synchronous and cheap (an in-memory buffer append); network
//!   publishing happens on `flush`/`stop` so hot paths never await the sink.
//! - Absence of a sink means metrics are off; callers hold an
//!   `Option<Arc<dyn MetricSink>>`, never a silently-dropping stub.

use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use tracing::debug;

use crate::error::{TelemetryError, TelemetryResult};

/// Maximum data points per publish request.
const MAX_BATCH: usize = 20;

/// Dimension name carrying the configured environment tag.
const ENV_DIMENSION: &str = "Environment";

/// Sink accepting metric observations from the scanner runtime.
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Record one count observation.
    fn count(&self, name: &str, value: f64);

    /// Publish everything recorded since the previous flush.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing transport rejects the publish.
    async fn flush(&self) -> TelemetryResult<()>;

    /// Flush and release the sink. Called once during ordered shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error when the final flush fails.
    async fn stop(&self) -> TelemetryResult<()>;
}

/// CloudWatch-backed metric sink parametrized by namespace and environment
/// tag.
pub struct CloudWatchMetricSink {
    client: Client,
    namespace: String,
    env_tag: String,
    buffer: Mutex<Vec<(String, f64)>>,
}

impl CloudWatchMetricSink {
    /// Construct a sink publishing through the provided client.
    #[must_use]
    pub const fn new(client: Client, namespace: String, env_tag: String) -> Self {
        Self {
            client,
            namespace,
            env_tag,
            buffer: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<(String, f64)> {
        let mut buffer = self
            .buffer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *buffer)
    }

    fn datum(&self, name: &str, value: f64) -> MetricDatum {
        MetricDatum::builder()
            .metric_name(name)
            .value(value)
            .unit(StandardUnit::Count)
            .dimensions(
                Dimension::builder()
                    .name(ENV_DIMENSION)
                    .value(&self.env_tag)
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl MetricSink for CloudWatchMetricSink {
    fn count(&self, name: &str, value: f64) {
        let mut buffer = self
            .buffer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        buffer.push((name.to_string(), value));
    }

    async fn flush(&self) -> TelemetryResult<()> {
        let pending = self.drain();
        if pending.is_empty() {
            return Ok(());
        }

        for batch in pending.chunks(MAX_BATCH) {
            let data: Vec<MetricDatum> = batch
                .iter()
                .map(|(name, value)| self.datum(name, *value))
                .collect();
            self.client
                .put_metric_data()
                .namespace(&self.namespace)
                .set_metric_data(Some(data))
                .send()
                .await
                .map_err(|source| TelemetryError::MetricsPublish {
                    namespace: self.namespace.clone(),
                    source: Box::new(source),
                })?;
        }

        debug!(
            namespace = %self.namespace,
            points = pending.len(),
            "published metric data"
        );
        Ok(())
    }

    async fn stop(&self) -> TelemetryResult<()> {
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> aws_sdk_cloudwatch::Config {
        use aws_smithy_async::rt::sleep::{SharedAsyncSleep, TokioSleep};

        // Client construction validates that a sleep implementation backs the
        // config, so the hand-built config must carry one explicitly.
        aws_sdk_cloudwatch::Config::builder()
            .behavior_version(aws_sdk_cloudwatch::config::BehaviorVersion::latest())
            .sleep_impl(SharedAsyncSleep::new(TokioSleep::new()))
            .build()
    }

    #[test]
    fn datum_carries_environment_dimension() {
        let config = offline_config();
        let sink = CloudWatchMetricSink::new(
            Client::from_conf(config),
            "chainscan".to_string(),
            "devnet".to_string(),
        );
        let datum = sink.datum("events_scanned", 3.0);
        assert_eq!(datum.metric_name(), Some("events_scanned"));
        let dimensions = datum.dimensions();
        assert_eq!(dimensions.len(), 1);
        assert_eq!(dimensions[0].name(), Some(ENV_DIMENSION));
        assert_eq!(dimensions[0].value(), Some("devnet"));
    }

    #[test]
    fn drain_empties_the_buffer() {
        let config = offline_config();
        let sink = CloudWatchMetricSink::new(
            Client::from_conf(config),
            "chainscan".to_string(),
            "devnet".to_string(),
        );
        sink.count("events_scanned", 1.0);
        sink.count("events_broadcast", 2.0);
        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert!(sink.drain().is_empty());
    }
}
