//! Broadcaster composition: turns the configured topology into one sink.
//!
//! # Design
//! - Slots are built independently; one failing slot is logged and dropped
//!   so the remaining destinations still receive events.
//! - An empty topology falls back to the console sink; a topology whose
//!   every slot failed is a startup error instead.

use std::sync::Arc;

use chainscan_broadcast::{
    ConsoleSink, EventSink, HttpSink, MulticastSink, SnsSink, SqsSink, UniqueSink,
};
use chainscan_config::{AppConfig, BroadcasterConfig, HttpConfig, UniqueCheckerConfig};
use chainscan_store::{DbUniqueChecker, SqliteUniqueChecker, UniqueChecker};
use tracing::error;

use crate::credentials::CloudCredentials;
use crate::error::{AppError, AppResult};

/// The assembled broadcaster plus one summary line per live destination.
pub(crate) struct ComposedBroadcaster {
    /// Sink receiving every scanned event.
    pub(crate) sink: Arc<dyn EventSink>,
    /// Human-readable description of each live destination, in topology
    /// order.
    pub(crate) summary: Vec<String>,
}

/// Assemble the broadcaster topology named by the configuration.
pub(crate) async fn compose_broadcaster(
    config: &AppConfig,
    credentials: &CloudCredentials,
) -> AppResult<ComposedBroadcaster> {
    let mut sinks: Vec<Arc<dyn EventSink>> = Vec::new();
    let mut summary = Vec::new();
    let mut failed = 0;

    for slot in &config.broadcasters {
        match build_slot(config, credentials, slot).await {
            Ok((sink, description)) => {
                sinks.push(sink);
                summary.push(description);
            }
            Err(err) => {
                failed += 1;
                error!(error = %err, "skipping broadcaster that failed to build");
            }
        }
    }

    if sinks.is_empty() {
        if failed > 0 {
            return Err(AppError::NoBroadcaster { failed });
        }
        return Ok(ComposedBroadcaster {
            sink: Arc::new(ConsoleSink::new()),
            summary: vec!["console".to_string()],
        });
    }

    let sink: Arc<dyn EventSink> = if sinks.len() == 1 {
        sinks.remove(0)
    } else {
        Arc::new(MulticastSink::new(sinks))
    };
    Ok(ComposedBroadcaster { sink, summary })
}

/// Build one topology slot into a sink and its summary line.
async fn build_slot(
    config: &AppConfig,
    credentials: &CloudCredentials,
    slot: &BroadcasterConfig,
) -> AppResult<(Arc<dyn EventSink>, String)> {
    match slot {
        BroadcasterConfig::Console => {
            Ok((Arc::new(ConsoleSink::new()), "console".to_string()))
        }
        BroadcasterConfig::Http { http } => build_http_slot(config, http).await,
        BroadcasterConfig::Sqs { sqs } => {
            let sink = SqsSink::new(
                credentials.sqs_client(),
                sqs.queue_url.clone(),
                sqs.message_group_id.clone(),
            );
            let description = format!("sqs ({}, {})", sqs.queue_url, sqs.message_group_id);
            Ok((Arc::new(sink), description))
        }
        BroadcasterConfig::Sns { sns } => {
            let sink = SnsSink::new(
                credentials.sns_client(),
                sns.topic_arn.clone(),
                sns.message_group_id.clone(),
            );
            let description = format!("sns ({}, {})", sns.topic_arn, sns.message_group_id);
            Ok((Arc::new(sink), description))
        }
    }
}

/// Build the http slot, wrapping it in a dedup filter when one is
/// configured.
async fn build_http_slot(
    config: &AppConfig,
    http: &HttpConfig,
) -> AppResult<(Arc<dyn EventSink>, String)> {
    let sink = HttpSink::new(http.endpoint.clone(), http.shared_secret.clone())
        .map_err(|err| AppError::broadcast("http_sink.new", err))?;
    let signed = if sink.is_signed() { " signed" } else { "" };

    let Some(unique) = &http.unique_checker else {
        let description = format!("http{signed} ({})", http.endpoint);
        return Ok((Arc::new(sink), description));
    };

    let (checker, backend) = build_unique_checker(config, unique).await?;
    let description = format!("http{signed} [unique: {backend}] ({})", http.endpoint);
    let wrapped = UniqueSink::new(checker, Arc::new(sink));
    Ok((Arc::new(wrapped), description))
}

/// Build the dedup filter's backing store.
async fn build_unique_checker(
    config: &AppConfig,
    unique: &UniqueCheckerConfig,
) -> AppResult<(Arc<dyn UniqueChecker>, &'static str)> {
    match unique {
        UniqueCheckerConfig::Sqlite { sqlite } => {
            let checker = SqliteUniqueChecker::connect(&sqlite.file, sqlite.group_id.clone())
                .await
                .map_err(|err| AppError::store("unique.connect", err))?;
            Ok((Arc::new(checker), "sqlite"))
        }
        UniqueCheckerConfig::Db { db } => {
            let connection = config.db_connections.get(&db.connection).ok_or_else(|| {
                AppError::InvalidConfig {
                    field: "unique_checker.connection",
                    reason: "unknown_connection",
                    value: Some(db.connection.clone()),
                }
            })?;
            let checker = DbUniqueChecker::connect(connection, &db.table_name, db.group_id.clone())
                .await
                .map_err(|err| AppError::store("unique.connect", err))?;
            Ok((Arc::new(checker), "db"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chainscan_config::model::{SnsConfig, SqliteUniqueChecker as SqliteUniqueCheckerConfig, SqsConfig};
    use chainscan_config::{LogFormat, SettingsConfig};

    use super::*;
    use crate::credentials::offline_credentials;

    fn config_with(broadcasters: Vec<BroadcasterConfig>) -> AppConfig {
        AppConfig {
            access_node: "access.devnet.example:9000".to_string(),
            max_requests_per_second: 10,
            event_types: vec!["A.1234.Market.Listed".to_string()],
            start_height: None,
            log_level: "debug".to_string(),
            log_format: LogFormat::Json,
            settings: SettingsConfig::Memory,
            broadcasters,
            metrics: None,
            aws: None,
            db_connections: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn empty_topology_falls_back_to_console() -> anyhow::Result<()> {
        let credentials = offline_credentials();
        let composed = compose_broadcaster(&config_with(Vec::new()), &credentials).await?;
        assert_eq!(composed.summary, vec!["console".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn queue_and_topic_slots_compose_in_order() -> anyhow::Result<()> {
        let credentials = offline_credentials();
        let config = config_with(vec![
            BroadcasterConfig::Sqs {
                sqs: SqsConfig {
                    queue_url: "https://sqs.us-east-1.amazonaws.com/1/events.fifo".to_string(),
                    message_group_id: "chainscan-events".to_string(),
                },
            },
            BroadcasterConfig::Sns {
                sns: SnsConfig {
                    topic_arn: "arn:aws:sns:us-east-1:1:events.fifo".to_string(),
                    message_group_id: "chainscan-events".to_string(),
                },
            },
        ]);

        let composed = compose_broadcaster(&config, &credentials).await?;
        assert_eq!(
            composed.summary,
            vec![
                "sqs (https://sqs.us-east-1.amazonaws.com/1/events.fifo, chainscan-events)"
                    .to_string(),
                "sns (arn:aws:sns:us-east-1:1:events.fifo, chainscan-events)".to_string(),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn http_slot_reports_signing_and_dedup() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("unique.db");
        let file = file.to_str().expect("tempdir path should be utf-8");

        let credentials = offline_credentials();
        let config = config_with(vec![BroadcasterConfig::Http {
            http: HttpConfig {
                endpoint: "https://hooks.example/events".to_string(),
                shared_secret: Some("secret".to_string()),
                unique_checker: Some(UniqueCheckerConfig::Sqlite {
                    sqlite: SqliteUniqueCheckerConfig {
                        file: file.to_string(),
                        group_id: None,
                    },
                }),
            },
        }]);

        let composed = compose_broadcaster(&config, &credentials).await?;
        assert_eq!(
            composed.summary,
            vec!["http signed [unique: sqlite] (https://hooks.example/events)".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_unique_connection_fails_the_topology() {
        let credentials = offline_credentials();
        let config = config_with(vec![BroadcasterConfig::Http {
            http: HttpConfig {
                endpoint: "https://hooks.example/events".to_string(),
                shared_secret: None,
                unique_checker: Some(UniqueCheckerConfig::Db {
                    db: chainscan_config::model::DbUniqueChecker {
                        connection: "reporting".to_string(),
                        table_name: "broadcasts".to_string(),
                        group_id: None,
                    },
                }),
            },
        }]);

        let result = compose_broadcaster(&config, &credentials).await;
        assert!(matches!(result, Err(AppError::NoBroadcaster { failed: 1 })));
    }
}
