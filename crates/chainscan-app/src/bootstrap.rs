//! Application boot sequence: resolve configuration, install logging, wire
//! the providers together, and hand the engine to the supervisor.

use std::sync::Arc;

use chainscan_config::AppConfig;
use chainscan_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::info;

use crate::composer::compose_broadcaster;
use crate::credentials::CloudCredentials;
use crate::engine::{EngineProviders, StubEngine};
use crate::error::{AppError, AppResult};
use crate::selectors::{select_metric_sink, select_settings_store};
use crate::supervisor::Supervisor;

/// Entry point for the scanner daemon boot sequence.
///
/// # Errors
///
/// Returns an error when configuration resolution, logging installation, or
/// provider wiring fails, or when the supervised engine fails to start or
/// stop.
pub async fn run_app() -> AppResult<()> {
    let config = AppConfig::from_env().map_err(|err| AppError::config("config.resolve", err))?;

    init_logging(&LoggingConfig {
        level: &config.log_level,
        format: log_format(&config),
    })
    .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    // Resolution tolerates an empty list so operators can stage variables;
    // actually starting without anything to scan is a startup error.
    if config.event_types.is_empty() {
        return Err(AppError::InvalidConfig {
            field: "event_types",
            reason: "empty",
            value: None,
        });
    }

    let credentials = CloudCredentials::resolve(config.aws.as_ref()).await;

    let (settings, settings_summary) = select_settings_store(&config).await?;
    let metrics = select_metric_sink(&config, &credentials);
    let broadcaster = compose_broadcaster(&config, &credentials).await?;

    info!(
        "{}",
        startup_summary(
            &config.access_node,
            &broadcaster.summary,
            &settings_summary,
            metrics.as_ref().map(|(_, summary)| summary.as_str()),
        )
    );
    info!("{}", event_type_summary(&config.event_types));
    let metrics = metrics.map(|(sink, _)| sink);

    let engine = StubEngine::new(EngineProviders {
        config,
        broadcaster: broadcaster.sink,
        settings,
        metrics: metrics.clone(),
    });
    Supervisor::new(Arc::new(engine), metrics).run().await
}

/// Map the resolved log format onto the telemetry crate's.
const fn log_format(config: &AppConfig) -> LogFormat {
    match config.log_format {
        chainscan_config::LogFormat::Json => LogFormat::Json,
        chainscan_config::LogFormat::Pretty => LogFormat::Pretty,
    }
}

/// One consolidated multi-line startup message naming every active
/// provider.
fn startup_summary(
    access_node: &str,
    broadcaster_summary: &[String],
    settings_summary: &str,
    metrics_summary: Option<&str>,
) -> String {
    let mut lines = vec![
        "Using configuration:".to_string(),
        format!("Using access node: {access_node}"),
    ];
    lines.extend(
        broadcaster_summary
            .iter()
            .map(|entry| format!("Using event broadcaster: {entry}")),
    );
    lines.push(format!("Using settings provider: {settings_summary}"));
    if let Some(summary) = metrics_summary {
        lines.push(format!("Enabled CloudWatch metrics: {summary}"));
    }
    lines.join("\n")
}

/// The monitored event types, one line each, as a single message.
fn event_type_summary(event_types: &[String]) -> String {
    event_types
        .iter()
        .map(|event_type| format!("Monitoring event type: {event_type}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_summary_is_one_multi_line_message() {
        let summary = startup_summary(
            "access.devnet.example:9000",
            &[
                "sqs (https://sqs.example/queue, chainscan-events)".to_string(),
                "console".to_string(),
            ],
            "sqlite (/var/lib/chainscan/settings.db)",
            Some("cloudwatch (chainscan, devnet)"),
        );
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Using configuration:",
                "Using access node: access.devnet.example:9000",
                "Using event broadcaster: sqs (https://sqs.example/queue, chainscan-events)",
                "Using event broadcaster: console",
                "Using settings provider: sqlite (/var/lib/chainscan/settings.db)",
                "Enabled CloudWatch metrics: cloudwatch (chainscan, devnet)",
            ]
        );
    }

    #[test]
    fn startup_summary_omits_metrics_when_absent() {
        let summary = startup_summary("node", &[], "memory", None);
        assert!(!summary.contains("CloudWatch"));
        assert!(summary.ends_with("Using settings provider: memory"));
    }

    #[test]
    fn event_type_listing_names_each_type() {
        let listing = event_type_summary(&[
            "A.1234.Market.Listed".to_string(),
            "A.1234.Market.Sold".to_string(),
        ]);
        assert_eq!(
            listing,
            "Monitoring event type: A.1234.Market.Listed\n\
             Monitoring event type: A.1234.Market.Sold"
        );
    }
}
