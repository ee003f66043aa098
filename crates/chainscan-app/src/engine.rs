//! Scanning engine seam.
//!
//! The engine is the component that talks to the chain access node, watches
//! for the configured event types, and hands each sighting to the assembled
//! broadcaster. The seam keeps composition and lifecycle testable without a
//! live chain; the stub implementation stands in until a protocol-specific
//! engine is wired up.

use std::sync::Arc;

use async_trait::async_trait;
use chainscan_broadcast::EventSink;
use chainscan_config::AppConfig;
use chainscan_store::SettingsStore;
use chainscan_telemetry::MetricSink;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Settings key holding the height the engine last finished scanning.
pub const LAST_SCANNED_HEIGHT_KEY: &str = "lastScannedHeight";

/// Everything an engine needs to do its job.
pub struct EngineProviders {
    /// Resolved application configuration.
    pub config: AppConfig,
    /// Sink receiving every scanned event.
    pub broadcaster: Arc<dyn EventSink>,
    /// Bookkeeping store for scan progress.
    pub settings: Arc<dyn SettingsStore>,
    /// Optional metric sink; absence means metrics are off.
    pub metrics: Option<Arc<dyn MetricSink>>,
}

/// Chain-scanning engine lifecycle.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    /// Begin scanning. Resolves once the engine is running.
    async fn start(&self) -> AppResult<()>;

    /// Stop scanning and release resources. Called once during ordered
    /// shutdown, after the drain delay.
    async fn stop(&self) -> AppResult<()>;
}

/// Engine stand-in that validates its wiring and reports scan progress
/// bookkeeping without contacting a chain.
pub struct StubEngine {
    providers: EngineProviders,
}

impl StubEngine {
    /// Construct the stub around the assembled providers.
    #[must_use]
    pub const fn new(providers: EngineProviders) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ScanEngine for StubEngine {
    async fn start(&self) -> AppResult<()> {
        let config = &self.providers.config;
        let resume_height = self
            .providers
            .settings
            .get(LAST_SCANNED_HEIGHT_KEY)
            .await
            .map_err(|err| AppError::store("engine.resume_height", err))?;
        let starting_at = match (resume_height, config.start_height) {
            (Some(height), _) => height,
            (None, Some(height)) => height.to_string(),
            (None, None) => "latest".to_string(),
        };

        if let Some(metrics) = &self.providers.metrics {
            metrics.count("EngineStarted", 1.0);
        }

        info!(
            access_node = %config.access_node,
            max_requests_per_second = config.max_requests_per_second,
            starting_at = %starting_at,
            "scan engine ready"
        );
        Ok(())
    }

    async fn stop(&self) -> AppResult<()> {
        info!("scan engine stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chainscan_broadcast::ConsoleSink;
    use chainscan_config::{LogFormat, SettingsConfig};
    use chainscan_store::MemorySettingsStore;

    use super::*;

    fn providers() -> EngineProviders {
        EngineProviders {
            config: AppConfig {
                access_node: "access.devnet.example:9000".to_string(),
                max_requests_per_second: 10,
                event_types: vec!["A.1234.Market.Listed".to_string()],
                start_height: Some(100),
                log_level: "debug".to_string(),
                log_format: LogFormat::Json,
                settings: SettingsConfig::Memory,
                broadcasters: Vec::new(),
                metrics: None,
                aws: None,
                db_connections: BTreeMap::new(),
            },
            broadcaster: Arc::new(ConsoleSink::new()),
            settings: Arc::new(MemorySettingsStore::new()),
            metrics: None,
        }
    }

    #[tokio::test]
    async fn stub_engine_starts_and_stops() -> anyhow::Result<()> {
        let engine = StubEngine::new(providers());
        engine.start().await?;
        engine.stop().await?;
        Ok(())
    }

    #[tokio::test]
    async fn stub_engine_prefers_stored_resume_height() -> anyhow::Result<()> {
        let providers = providers();
        providers
            .settings
            .put(LAST_SCANNED_HEIGHT_KEY, "250")
            .await?;
        let engine = StubEngine::new(providers);
        engine.start().await?;
        Ok(())
    }
}
