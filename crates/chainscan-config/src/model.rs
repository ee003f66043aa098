//! Typed configuration models for the scanner runtime.
//!
//! # Design
//! - Pure data carriers, constructed once by the resolver and read-only
//!   thereafter.
//! - Tagged-union sub-configs mirror the JSON wire shape accepted through the
//!   `*_JSON` override variables, so a JSON blob and the discrete variables
//!   deserialise into the same types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fully resolved application configuration.
///
/// Constructed exactly once at startup; every field is read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address of the chain access node the scanner connects to.
    pub access_node: String,
    /// Upper bound on access-node requests per second.
    pub max_requests_per_second: u32,
    /// Event-type names to monitor, in configured order. Must be non-empty
    /// by the time the lifecycle enters its starting phase.
    pub event_types: Vec<String>,
    /// Optional block height to begin scanning from when no bookkeeping
    /// exists yet.
    pub start_height: Option<u64>,
    /// Log level applied when installing the tracing subscriber.
    pub log_level: String,
    /// Output format applied when installing the tracing subscriber.
    pub log_format: LogFormat,
    /// Backing store for scanner bookkeeping.
    pub settings: SettingsConfig,
    /// Broadcaster topology, in configured order. May be empty, in which
    /// case the composer falls back to the console broadcaster.
    pub broadcasters: Vec<BroadcasterConfig>,
    /// Optional metrics sink configuration.
    pub metrics: Option<MetricsConfig>,
    /// Optional cloud credential configuration.
    pub aws: Option<AwsConfig>,
    /// Named database connections referenced by db-backed sub-configs.
    pub db_connections: BTreeMap<String, DbConfig>,
}

/// Log output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON log lines.
    Json,
    /// Human-readable log lines.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(ConfigError::UnknownProvider {
                kind: "log format",
                value: other.to_string(),
            }),
        }
    }
}

/// Backing store for scanner bookkeeping. Exactly one variant is active for
/// the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SettingsConfig {
    /// Ephemeral in-process store; the default for local use.
    Memory,
    /// Single-file local store.
    Sqlite {
        /// Sqlite payload.
        sqlite: SqliteSettings,
    },
    /// Store backed by a named database connection.
    Db {
        /// Database payload.
        db: DbSettings,
    },
}

/// Payload for the sqlite settings variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SqliteSettings {
    /// Path of the sqlite database file.
    pub file: String,
}

/// Payload for the db settings variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbSettings {
    /// Name of the connection in [`AppConfig::db_connections`].
    pub connection: String,
    /// Table holding the bookkeeping rows.
    pub table_name: String,
}

/// One entry in the broadcaster topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BroadcasterConfig {
    /// Writes every event to the operator log.
    Console,
    /// HTTP delivery, optionally signed and unique-checked.
    Http {
        /// HTTP payload.
        http: HttpConfig,
    },
    /// Delivery to an SQS queue.
    Sqs {
        /// SQS payload.
        sqs: SqsConfig,
    },
    /// Delivery to an SNS topic.
    Sns {
        /// SNS payload.
        sns: SnsConfig,
    },
}

/// HTTP broadcaster payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Endpoint events are POSTed to.
    pub endpoint: String,
    /// Shared secret enabling HMAC signing of the request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
    /// Optional dedup filter applied before delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_checker: Option<UniqueCheckerConfig>,
}

/// SQS broadcaster payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SqsConfig {
    /// Target queue URL.
    pub queue_url: String,
    /// Message group id applied to every delivery.
    pub message_group_id: String,
}

/// SNS broadcaster payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnsConfig {
    /// Target topic ARN.
    pub topic_arn: String,
    /// Message group id applied to every delivery.
    pub message_group_id: String,
}

/// Dedup-filter backing store, nested only under the http broadcaster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UniqueCheckerConfig {
    /// Single-file local store.
    Sqlite {
        /// Sqlite payload.
        sqlite: SqliteUniqueChecker,
    },
    /// Store backed by a named database connection.
    Db {
        /// Database payload.
        db: DbUniqueChecker,
    },
}

/// Payload for the sqlite unique-checker variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SqliteUniqueChecker {
    /// Path of the sqlite database file.
    pub file: String,
    /// Optional scope partitioning the uniqueness check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Payload for the db unique-checker variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbUniqueChecker {
    /// Name of the connection in [`AppConfig::db_connections`].
    pub connection: String,
    /// Table holding the seen-event rows.
    pub table_name: String,
    /// Optional scope partitioning the uniqueness check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Metrics sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetricsConfig {
    /// CloudWatch metrics sink.
    Cloudwatch {
        /// CloudWatch payload.
        cloudwatch: CloudwatchMetrics,
    },
}

/// Payload for the CloudWatch metrics variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudwatchMetrics {
    /// Namespace metrics are published under.
    pub namespace: String,
    /// Environment tag attached to every data point.
    pub env_tag: String,
}

/// Cloud credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsConfig {
    /// When set, ambient IAM credentials apply and the explicit key pair is
    /// ignored.
    pub use_iam: bool,
    /// Explicit access key id.
    pub access_key_id: String,
    /// Explicit secret access key.
    pub secret_access_key: String,
    /// Region applied to every cloud-backed client.
    pub region: String,
}

/// One named database connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database user.
    pub user: String,
    /// Optional password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Database (schema) name.
    pub database: String,
    /// Optional secret-manager reference holding rotated credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_credentials_secret_name: Option<String>,
    /// TLS mode for the connection.
    #[serde(default = "SslMode::off")]
    pub use_ssl: SslMode,
}

/// Default database port when the connection omits one.
const fn default_db_port() -> u16 {
    3306
}

/// TLS mode for a database connection.
///
/// The wire encoding is tri-state: `false`, `true`, or the literal string
/// `"rds"` for the managed-certificate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    /// Plaintext connection.
    Off,
    /// TLS with standard certificate verification.
    On,
    /// TLS against the cloud provider's managed certificate bundle.
    RdsManaged,
}

impl SslMode {
    /// Default when a connection omits the field.
    #[must_use]
    pub const fn off() -> Self {
        Self::Off
    }
}

impl Serialize for SslMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Off => serializer.serialize_bool(false),
            Self::On => serializer.serialize_bool(true),
            Self::RdsManaged => serializer.serialize_str("rds"),
        }
    }
}

impl<'de> Deserialize<'de> for SslMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SslModeVisitor;

        impl Visitor<'_> for SslModeVisitor {
            type Value = SslMode;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a boolean or the string \"rds\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(if value { SslMode::On } else { SslMode::Off })
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value.eq_ignore_ascii_case("rds") {
                    Ok(SslMode::RdsManaged)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(SslModeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_config_matches_wire_shape() -> anyhow::Result<()> {
        let parsed: SettingsConfig = serde_json::from_value(json!({
            "type": "sqlite",
            "sqlite": { "file": "/var/lib/chainscan/settings.db" },
        }))?;
        assert_eq!(
            parsed,
            SettingsConfig::Sqlite {
                sqlite: SqliteSettings {
                    file: "/var/lib/chainscan/settings.db".to_string(),
                },
            }
        );

        let parsed: SettingsConfig = serde_json::from_value(json!({
            "type": "db",
            "db": { "connection": "db", "tableName": "scanner_settings" },
        }))?;
        assert_eq!(
            parsed,
            SettingsConfig::Db {
                db: DbSettings {
                    connection: "db".to_string(),
                    table_name: "scanner_settings".to_string(),
                },
            }
        );

        let parsed: SettingsConfig = serde_json::from_value(json!({ "type": "memory" }))?;
        assert_eq!(parsed, SettingsConfig::Memory);
        Ok(())
    }

    #[test]
    fn settings_config_rejects_unknown_discriminator() {
        let result: Result<SettingsConfig, _> =
            serde_json::from_value(json!({ "type": "etcd" }));
        assert!(result.is_err());
    }

    #[test]
    fn ssl_mode_accepts_all_wire_forms() -> anyhow::Result<()> {
        assert_eq!(serde_json::from_value::<SslMode>(json!(false))?, SslMode::Off);
        assert_eq!(serde_json::from_value::<SslMode>(json!(true))?, SslMode::On);
        assert_eq!(
            serde_json::from_value::<SslMode>(json!("rds"))?,
            SslMode::RdsManaged
        );
        assert_eq!(
            serde_json::from_value::<SslMode>(json!("RDS"))?,
            SslMode::RdsManaged
        );
        assert!(serde_json::from_value::<SslMode>(json!("maybe")).is_err());
        Ok(())
    }

    #[test]
    fn db_config_defaults_port_and_ssl() -> anyhow::Result<()> {
        let parsed: DbConfig = serde_json::from_value(json!({
            "host": "db.internal",
            "user": "scanner",
            "database": "chainscan",
        }))?;
        assert_eq!(parsed.port, 3306);
        assert_eq!(parsed.use_ssl, SslMode::Off);
        assert!(parsed.password.is_none());
        Ok(())
    }

    #[test]
    fn log_format_parses_known_values_only() {
        assert_eq!("json".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>().ok(), Some(LogFormat::Pretty));
        assert!("hidden".parse::<LogFormat>().is_err());
    }
}
