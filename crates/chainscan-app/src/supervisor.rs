//! Ordered shutdown supervision.
//!
//! # Design
//! - One latch, triggered at most once; every subsequent trigger is a no-op
//!   so repeated signals cannot restart the shutdown.
//! - Waiting is event-driven on a watch channel; there is no polling loop.
//! - Shutdown order: observe the trigger, stop the engine, flush and
//!   release the metric sink, then wait out the drain delay so queued
//!   deliveries settle before the process exits.

use std::sync::Arc;
use std::time::Duration;

use chainscan_telemetry::MetricSink;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tracing::info;

use crate::engine::ScanEngine;
use crate::error::{AppError, AppResult};

/// Settle time between engine stop and process exit.
pub const DRAIN_DELAY: Duration = Duration::from_secs(5);

/// One-shot shutdown latch shared between signal listeners and the
/// supervisor.
#[derive(Debug, Clone)]
pub struct StopLatch {
    tx: watch::Sender<bool>,
}

impl StopLatch {
    /// Construct an untriggered latch.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Trigger the latch. Returns `true` on the first trigger, `false` on
    /// every later one.
    #[must_use = "reports whether this call was the first trigger"]
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Resolve once the latch has been triggered. Resolves immediately when
    /// it already was.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for StopLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the engine until a shutdown trigger, then drains and stops it.
pub struct Supervisor {
    engine: Arc<dyn ScanEngine>,
    metrics: Option<Arc<dyn MetricSink>>,
}

impl Supervisor {
    /// Construct a supervisor over the engine and optional metric sink.
    #[must_use]
    pub const fn new(engine: Arc<dyn ScanEngine>, metrics: Option<Arc<dyn MetricSink>>) -> Self {
        Self { engine, metrics }
    }

    /// Start the engine and block until a termination signal completes the
    /// ordered shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error when signal handlers cannot be installed or the
    /// engine fails to start or stop.
    pub async fn run(&self) -> AppResult<()> {
        let latch = StopLatch::new();
        spawn_signal_listener(latch.clone())?;
        self.run_until(&latch).await
    }

    /// Start the engine and block until `latch` triggers, then stop and
    /// drain. Split from [`Supervisor::run`] so tests drive shutdown without
    /// process signals.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine fails to start or stop, or when the
    /// final metrics flush fails.
    pub async fn run_until(&self, latch: &StopLatch) -> AppResult<()> {
        self.engine.start().await?;

        latch.wait().await;
        info!("shutdown requested, stopping engine");
        self.engine.stop().await?;
        if let Some(metrics) = &self.metrics {
            metrics
                .stop()
                .await
                .map_err(|err| AppError::telemetry("metrics.stop", err))?;
        }

        info!(
            drain_seconds = DRAIN_DELAY.as_secs(),
            "draining before exit"
        );
        tokio::time::sleep(DRAIN_DELAY).await;
        info!("shutdown complete");
        Ok(())
    }
}

/// Install SIGTERM/SIGINT listeners that trigger the latch.
fn spawn_signal_listener(latch: StopLatch) -> AppResult<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).map_err(|err| AppError::io("signal.install", err))?;
    let mut sigint =
        signal(SignalKind::interrupt()).map_err(|err| AppError::io("signal.install", err))?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
        let _ = latch.trigger();
    });
    Ok(())
}
