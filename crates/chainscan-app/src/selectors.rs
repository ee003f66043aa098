//! Provider selection: maps resolved configuration onto concrete stores and
//! metric sinks, returning a human-readable summary alongside each choice.

use std::sync::Arc;

use chainscan_config::{AppConfig, MetricsConfig, SettingsConfig};
use chainscan_store::{DbSettingsStore, MemorySettingsStore, SettingsStore, SqliteSettingsStore};
use chainscan_telemetry::{CloudWatchMetricSink, MetricSink};

use crate::credentials::CloudCredentials;
use crate::error::{AppError, AppResult};

/// Build the settings store named by the configuration.
///
/// Returns the store together with a summary string for the startup log.
pub(crate) async fn select_settings_store(
    config: &AppConfig,
) -> AppResult<(Arc<dyn SettingsStore>, String)> {
    match &config.settings {
        SettingsConfig::Memory => {
            let store: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::new());
            Ok((store, "memory".to_string()))
        }
        SettingsConfig::Sqlite { sqlite } => {
            let store = SqliteSettingsStore::connect(&sqlite.file)
                .await
                .map_err(|err| AppError::store("settings.connect", err))?;
            Ok((Arc::new(store), format!("sqlite ({})", sqlite.file)))
        }
        SettingsConfig::Db { db } => {
            let connection = config.db_connections.get(&db.connection).ok_or_else(|| {
                AppError::InvalidConfig {
                    field: "settings.connection",
                    reason: "unknown_connection",
                    value: Some(db.connection.clone()),
                }
            })?;
            let store = DbSettingsStore::connect(connection, &db.table_name)
                .await
                .map_err(|err| AppError::store("settings.connect", err))?;
            Ok((Arc::new(store), format!("db ({})", db.connection)))
        }
    }
}

/// Build the metric sink named by the configuration, if any.
pub(crate) fn select_metric_sink(
    config: &AppConfig,
    credentials: &CloudCredentials,
) -> Option<(Arc<dyn MetricSink>, String)> {
    let metrics = config.metrics.as_ref()?;
    match metrics {
        MetricsConfig::Cloudwatch { cloudwatch } => {
            let sink = CloudWatchMetricSink::new(
                credentials.cloudwatch_client(),
                cloudwatch.namespace.clone(),
                cloudwatch.env_tag.clone(),
            );
            let summary = format!("cloudwatch ({}, {})", cloudwatch.namespace, cloudwatch.env_tag);
            Some((Arc::new(sink), summary))
        }
    }
}
