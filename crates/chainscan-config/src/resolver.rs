//! Environment snapshot and resolution into [`AppConfig`].
//!
//! Resolution reads from a [`Vars`] snapshot rather than process state so
//! tests exercise the full path without mutating the environment.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AppConfig, AwsConfig, BroadcasterConfig, CloudwatchMetrics, DbConfig, DbSettings,
    DbUniqueChecker, HttpConfig, MetricsConfig, SettingsConfig, SnsConfig, SqliteSettings,
    SqliteUniqueChecker, SqsConfig, SslMode, UniqueCheckerConfig,
};
use crate::parse::{parse_bool, parse_list};

/// Environment variable names consumed by the resolver.
pub mod keys {
    /// Address of the chain access node. Required.
    pub const ACCESS_NODE: &str = "CHAINSCAN_ACCESS_NODE";
    /// Comma-separated event-type names. Required.
    pub const EVENT_TYPES: &str = "CHAINSCAN_EVENT_TYPES";
    /// Upper bound on access-node requests per second.
    pub const MAX_REQUESTS_PER_SECOND: &str = "CHAINSCAN_MAX_REQUESTS_PER_SECOND";
    /// Block height to begin scanning from.
    pub const START_HEIGHT: &str = "CHAINSCAN_START_HEIGHT";
    /// Log level for the tracing subscriber.
    pub const LOG_LEVEL: &str = "CHAINSCAN_LOG_LEVEL";
    /// Log format for the tracing subscriber (`json` or `pretty`).
    pub const LOG_FORMAT: &str = "CHAINSCAN_LOG_FORMAT";

    /// Explicit cloud access key id; its presence enables the aws config.
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    /// Explicit cloud secret access key.
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    /// Prefer ambient IAM credentials over the explicit key pair.
    pub const AWS_USE_IAM: &str = "AWS_USE_IAM";
    /// Region applied to every cloud-backed client.
    pub const AWS_REGION: &str = "AWS_REGION";

    /// JSON mapping of connection name to connection config; wins outright.
    pub const DB_CONNECTIONS_JSON: &str = "DB_CONNECTIONS_JSON";
    /// Host of the synthesized `db` connection.
    pub const DB_HOST: &str = "DB_HOST";
    /// Port of the synthesized `db` connection.
    pub const DB_PORT: &str = "DB_PORT";
    /// User of the synthesized `db` connection.
    pub const DB_USER: &str = "DB_USER";
    /// Password of the synthesized `db` connection.
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    /// Database name of the synthesized `db` connection.
    pub const DB_DATABASE: &str = "DB_DATABASE";
    /// Secret-manager reference for rotated credentials.
    pub const DB_AWS_CREDENTIALS_SECRET_NAME: &str = "DB_AWS_CREDENTIALS_SECRET_NAME";
    /// TLS mode of the synthesized `db` connection (`rds` or boolean).
    pub const DB_USE_SSL: &str = "DB_USE_SSL";

    /// JSON settings-provider config; wins outright.
    pub const SETTINGS_PROVIDER_JSON: &str = "SETTINGS_PROVIDER_JSON";
    /// Discrete settings-provider selector (`memory`, `sqlite`, `db`).
    pub const SETTINGS_PROVIDER: &str = "SETTINGS_PROVIDER";
    /// Sqlite file path for the sqlite settings provider.
    pub const SQLITE_SETTINGS_FILE: &str = "SQLITE_SETTINGS_FILE";
    /// Table name for the db settings provider.
    pub const DB_SETTINGS_TABLE_NAME: &str = "DB_SETTINGS_TABLE_NAME";

    /// SQS broadcaster trigger: target queue URL.
    pub const SQS_QUEUE_URL: &str = "SQS_BROADCASTER_QUEUE_URL";
    /// Message group id for the SQS broadcaster.
    pub const SQS_MESSAGE_GROUP_ID: &str = "SQS_BROADCASTER_MESSAGE_GROUP_ID";
    /// SNS broadcaster trigger: target topic ARN.
    pub const SNS_TOPIC_ARN: &str = "SNS_BROADCASTER_TOPIC_ARN";
    /// Message group id for the SNS broadcaster.
    pub const SNS_MESSAGE_GROUP_ID: &str = "SNS_BROADCASTER_MESSAGE_GROUP_ID";
    /// HTTP broadcaster trigger: delivery endpoint.
    pub const HTTP_ENDPOINT: &str = "HTTP_BROADCASTER_ENDPOINT";
    /// Shared secret enabling HMAC signing on the HTTP broadcaster.
    pub const HTTP_SHARED_SECRET: &str = "HTTP_BROADCASTER_SHARED_SECRET";
    /// Sqlite unique-checker trigger: database file path.
    pub const SQLITE_UNIQUE_CHECKER_FILE: &str = "SQLITE_UNIQUE_CHECKER_FILE";
    /// Db unique-checker trigger: table name.
    pub const DB_UNIQUE_CHECKER_TABLE_NAME: &str = "DB_UNIQUE_CHECKER_TABLE_NAME";
    /// Optional scope partitioning the uniqueness check.
    pub const UNIQUE_CHECKER_GROUP_ID: &str = "UNIQUE_CHECKER_GROUP_ID";

    /// Metrics-provider selector (`cloudwatch`).
    pub const METRICS_PROVIDER: &str = "METRICS_PROVIDER";
    /// Namespace for CloudWatch metrics.
    pub const CLOUDWATCH_METRICS_NAMESPACE: &str = "CLOUDWATCH_METRICS_NAMESPACE";
    /// Environment tag for CloudWatch metrics.
    pub const CLOUDWATCH_METRICS_ENV: &str = "CLOUDWATCH_METRICS_ENV";
}

/// Message group id applied when a queue/topic broadcaster omits one.
const DEFAULT_MESSAGE_GROUP_ID: &str = "chainscan-events";

/// Name of the connection synthesized from the discrete `DB_*` variables.
const SYNTHESIZED_CONNECTION: &str = "db";

/// Immutable snapshot of a flat key/value environment.
#[derive(Debug, Clone, Default)]
pub struct Vars(BTreeMap<String, String>);

impl Vars {
    /// Snapshot the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self(std::env::vars().collect())
    }

    /// Look up a variable. Empty values count as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on any missing required variable, value that
    /// does not parse, unknown provider discriminator, or unknown connection
    /// reference. All such errors are fatal to startup.
    pub fn from_env() -> ConfigResult<Self> {
        Self::resolve(&Vars::from_process())
    }

    /// Resolve configuration from an environment snapshot.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn resolve(vars: &Vars) -> ConfigResult<Self> {
        let missing: Vec<&'static str> = [keys::ACCESS_NODE, keys::EVENT_TYPES]
            .into_iter()
            .filter(|key| vars.get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars { names: missing });
        }

        let config = Self {
            access_node: vars
                .get(keys::ACCESS_NODE)
                .unwrap_or_default()
                .to_string(),
            max_requests_per_second: parse_u32(vars, keys::MAX_REQUESTS_PER_SECOND, 10)?,
            event_types: parse_list(vars.get(keys::EVENT_TYPES)),
            start_height: parse_optional_u64(vars, keys::START_HEIGHT)?,
            log_level: vars.get(keys::LOG_LEVEL).unwrap_or("debug").to_string(),
            log_format: vars
                .get(keys::LOG_FORMAT)
                .map_or(Ok(crate::model::LogFormat::Json), str::parse)?,
            settings: resolve_settings(vars)?,
            broadcasters: resolve_broadcasters(vars),
            metrics: resolve_metrics(vars)?,
            aws: resolve_aws(vars),
            db_connections: resolve_db_connections(vars)?,
        };

        validate_connections(&config)?;
        Ok(config)
    }
}

fn parse_u32(vars: &Vars, key: &'static str, default: u32) -> ConfigResult<u32> {
    vars.get(key).map_or(Ok(default), |raw| {
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "must be a non-negative integer",
        })
    })
}

fn parse_optional_u64(vars: &Vars, key: &'static str) -> ConfigResult<Option<u64>> {
    vars.get(key)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                key,
                value: raw.to_string(),
                reason: "must be a non-negative integer",
            })
        })
        .transpose()
}

fn resolve_aws(vars: &Vars) -> Option<AwsConfig> {
    vars.get(keys::AWS_ACCESS_KEY_ID).map(|key_id| AwsConfig {
        use_iam: parse_bool(vars.get(keys::AWS_USE_IAM), false),
        access_key_id: key_id.to_string(),
        secret_access_key: vars
            .get(keys::AWS_SECRET_ACCESS_KEY)
            .unwrap_or_default()
            .to_string(),
        region: vars.get(keys::AWS_REGION).unwrap_or_default().to_string(),
    })
}

fn resolve_db_connections(vars: &Vars) -> ConfigResult<BTreeMap<String, DbConfig>> {
    if let Some(blob) = vars.get(keys::DB_CONNECTIONS_JSON) {
        return serde_json::from_str(blob).map_err(|source| ConfigError::Json {
            key: keys::DB_CONNECTIONS_JSON,
            source,
        });
    }

    let Some(host) = vars.get(keys::DB_HOST) else {
        return Ok(BTreeMap::new());
    };

    let use_ssl = vars.get(keys::DB_USE_SSL).map_or(SslMode::Off, |raw| {
        if raw.eq_ignore_ascii_case("rds") {
            SslMode::RdsManaged
        } else if parse_bool(Some(raw), false) {
            SslMode::On
        } else {
            SslMode::Off
        }
    });

    let connection = DbConfig {
        host: host.to_string(),
        port: vars
            .get(keys::DB_PORT)
            .map_or(Ok(3306), |raw| {
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: keys::DB_PORT,
                    value: raw.to_string(),
                    reason: "must be a port number",
                })
            })?,
        user: vars.get(keys::DB_USER).unwrap_or_default().to_string(),
        password: vars.get(keys::DB_PASSWORD).map(str::to_string),
        database: vars.get(keys::DB_DATABASE).unwrap_or_default().to_string(),
        aws_credentials_secret_name: vars
            .get(keys::DB_AWS_CREDENTIALS_SECRET_NAME)
            .map(str::to_string),
        use_ssl,
    };

    Ok(BTreeMap::from([(
        SYNTHESIZED_CONNECTION.to_string(),
        connection,
    )]))
}

fn resolve_settings(vars: &Vars) -> ConfigResult<SettingsConfig> {
    if let Some(blob) = vars.get(keys::SETTINGS_PROVIDER_JSON) {
        return serde_json::from_str(blob).map_err(|source| ConfigError::Json {
            key: keys::SETTINGS_PROVIDER_JSON,
            source,
        });
    }

    match vars.get(keys::SETTINGS_PROVIDER) {
        None | Some("memory") => Ok(SettingsConfig::Memory),
        Some("sqlite") => {
            let file = vars
                .get(keys::SQLITE_SETTINGS_FILE)
                .ok_or(ConfigError::MissingVar {
                    name: keys::SQLITE_SETTINGS_FILE,
                    required_by: keys::SETTINGS_PROVIDER,
                })?;
            Ok(SettingsConfig::Sqlite {
                sqlite: SqliteSettings {
                    file: file.to_string(),
                },
            })
        }
        Some("db") => {
            let table_name =
                vars.get(keys::DB_SETTINGS_TABLE_NAME)
                    .ok_or(ConfigError::MissingVar {
                        name: keys::DB_SETTINGS_TABLE_NAME,
                        required_by: keys::SETTINGS_PROVIDER,
                    })?;
            Ok(SettingsConfig::Db {
                db: DbSettings {
                    connection: SYNTHESIZED_CONNECTION.to_string(),
                    table_name: table_name.to_string(),
                },
            })
        }
        Some(other) => Err(ConfigError::UnknownProvider {
            kind: "settings provider",
            value: other.to_string(),
        }),
    }
}

/// Broadcaster entries are appended in a fixed order: SQS, then SNS, then
/// HTTP, each only when its trigger variable is present.
fn resolve_broadcasters(vars: &Vars) -> Vec<BroadcasterConfig> {
    let mut broadcasters = Vec::new();

    if let Some(queue_url) = vars.get(keys::SQS_QUEUE_URL) {
        broadcasters.push(BroadcasterConfig::Sqs {
            sqs: SqsConfig {
                queue_url: queue_url.to_string(),
                message_group_id: vars
                    .get(keys::SQS_MESSAGE_GROUP_ID)
                    .unwrap_or(DEFAULT_MESSAGE_GROUP_ID)
                    .to_string(),
            },
        });
    }

    if let Some(topic_arn) = vars.get(keys::SNS_TOPIC_ARN) {
        broadcasters.push(BroadcasterConfig::Sns {
            sns: SnsConfig {
                topic_arn: topic_arn.to_string(),
                message_group_id: vars
                    .get(keys::SNS_MESSAGE_GROUP_ID)
                    .unwrap_or(DEFAULT_MESSAGE_GROUP_ID)
                    .to_string(),
            },
        });
    }

    if let Some(endpoint) = vars.get(keys::HTTP_ENDPOINT) {
        broadcasters.push(BroadcasterConfig::Http {
            http: HttpConfig {
                endpoint: endpoint.to_string(),
                shared_secret: vars.get(keys::HTTP_SHARED_SECRET).map(str::to_string),
                unique_checker: resolve_unique_checker(vars),
            },
        });
    }

    broadcasters
}

/// The sqlite file-path trigger takes priority over the db table-name
/// trigger when both are present.
fn resolve_unique_checker(vars: &Vars) -> Option<UniqueCheckerConfig> {
    let group_id = vars.get(keys::UNIQUE_CHECKER_GROUP_ID).map(str::to_string);

    if let Some(file) = vars.get(keys::SQLITE_UNIQUE_CHECKER_FILE) {
        return Some(UniqueCheckerConfig::Sqlite {
            sqlite: SqliteUniqueChecker {
                file: file.to_string(),
                group_id,
            },
        });
    }

    vars.get(keys::DB_UNIQUE_CHECKER_TABLE_NAME)
        .map(|table_name| UniqueCheckerConfig::Db {
            db: DbUniqueChecker {
                connection: SYNTHESIZED_CONNECTION.to_string(),
                table_name: table_name.to_string(),
                group_id,
            },
        })
}

fn resolve_metrics(vars: &Vars) -> ConfigResult<Option<MetricsConfig>> {
    match vars.get(keys::METRICS_PROVIDER) {
        None => Ok(None),
        Some("cloudwatch") => {
            let namespace =
                vars.get(keys::CLOUDWATCH_METRICS_NAMESPACE)
                    .ok_or(ConfigError::MissingVar {
                        name: keys::CLOUDWATCH_METRICS_NAMESPACE,
                        required_by: keys::METRICS_PROVIDER,
                    })?;
            let env_tag =
                vars.get(keys::CLOUDWATCH_METRICS_ENV)
                    .ok_or(ConfigError::MissingVar {
                        name: keys::CLOUDWATCH_METRICS_ENV,
                        required_by: keys::METRICS_PROVIDER,
                    })?;
            Ok(Some(MetricsConfig::Cloudwatch {
                cloudwatch: CloudwatchMetrics {
                    namespace: namespace.to_string(),
                    env_tag: env_tag.to_string(),
                },
            }))
        }
        Some(other) => Err(ConfigError::UnknownProvider {
            kind: "metrics provider",
            value: other.to_string(),
        }),
    }
}

/// Eagerly validate that every connection referenced by a db-backed
/// sub-config exists in the connection mapping, so a bad reference surfaces
/// as a named error at resolution rather than a fault at first use.
fn validate_connections(config: &AppConfig) -> ConfigResult<()> {
    if let SettingsConfig::Db { db } = &config.settings
        && !config.db_connections.contains_key(&db.connection)
    {
        return Err(ConfigError::UnknownConnection {
            section: "settings provider",
            connection: db.connection.clone(),
        });
    }

    for broadcaster in &config.broadcasters {
        if let BroadcasterConfig::Http { http } = broadcaster
            && let Some(UniqueCheckerConfig::Db { db }) = &http.unique_checker
            && !config.db_connections.contains_key(&db.connection)
        {
            return Err(ConfigError::UnknownConnection {
                section: "unique checker",
                connection: db.connection.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogFormat;

    fn minimal_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (keys::ACCESS_NODE, "access.devnet.example:9000"),
            (keys::EVENT_TYPES, "A.1234.Market.Listed"),
        ]
    }

    fn resolve(pairs: Vec<(&'static str, &'static str)>) -> ConfigResult<AppConfig> {
        AppConfig::resolve(&pairs.into_iter().collect())
    }

    #[test]
    fn minimal_environment_resolves_defaults() -> ConfigResult<()> {
        let config = resolve(minimal_vars())?;
        assert_eq!(config.access_node, "access.devnet.example:9000");
        assert_eq!(config.max_requests_per_second, 10);
        assert_eq!(config.event_types, vec!["A.1234.Market.Listed"]);
        assert!(config.start_height.is_none());
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.settings, SettingsConfig::Memory);
        assert!(config.broadcasters.is_empty());
        assert!(config.metrics.is_none());
        assert!(config.aws.is_none());
        assert!(config.db_connections.is_empty());
        Ok(())
    }

    #[test]
    fn missing_required_vars_are_reported_together() {
        let err = resolve(vec![]).unwrap_err();
        match err {
            ConfigError::MissingVars { names } => {
                assert_eq!(names, vec![keys::ACCESS_NODE, keys::EVENT_TYPES]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn event_types_are_trimmed_and_blanks_dropped() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars[1] = (keys::EVENT_TYPES, "a, b,,c");
        let config = resolve(vars)?;
        assert_eq!(config.event_types, vec!["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn blank_event_types_resolve_to_empty_list() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars[1] = (keys::EVENT_TYPES, "   ");
        let config = resolve(vars)?;
        assert!(config.event_types.is_empty());
        Ok(())
    }

    #[test]
    fn unset_settings_provider_selects_memory() -> ConfigResult<()> {
        let config = resolve(minimal_vars())?;
        assert_eq!(config.settings, SettingsConfig::Memory);
        Ok(())
    }

    #[test]
    fn settings_json_overrides_discrete_variables() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars.push((keys::SETTINGS_PROVIDER, "sqlite"));
        vars.push((keys::SQLITE_SETTINGS_FILE, "/tmp/discrete.db"));
        vars.push((
            keys::SETTINGS_PROVIDER_JSON,
            r#"{"type":"sqlite","sqlite":{"file":"/tmp/blob.db"}}"#,
        ));
        let config = resolve(vars)?;
        assert_eq!(
            config.settings,
            SettingsConfig::Sqlite {
                sqlite: SqliteSettings {
                    file: "/tmp/blob.db".to_string(),
                },
            }
        );
        Ok(())
    }

    #[test]
    fn sqlite_settings_require_a_file_path() {
        let mut vars = minimal_vars();
        vars.push((keys::SETTINGS_PROVIDER, "sqlite"));
        let err = resolve(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                name: keys::SQLITE_SETTINGS_FILE,
                ..
            }
        ));
    }

    #[test]
    fn unknown_settings_provider_is_a_named_error() {
        let mut vars = minimal_vars();
        vars.push((keys::SETTINGS_PROVIDER, "etcd"));
        let err = resolve(vars).unwrap_err();
        match err {
            ConfigError::UnknownProvider { kind, value } => {
                assert_eq!(kind, "settings provider");
                assert_eq!(value, "etcd");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sqs_then_sns_order_is_fixed() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars.push((keys::SNS_TOPIC_ARN, "arn:aws:sns:us-east-1:1:events"));
        vars.push((keys::SQS_QUEUE_URL, "https://sqs.example/queue"));
        let config = resolve(vars)?;
        assert_eq!(config.broadcasters.len(), 2);
        assert!(matches!(
            config.broadcasters[0],
            BroadcasterConfig::Sqs { .. }
        ));
        assert!(matches!(
            config.broadcasters[1],
            BroadcasterConfig::Sns { .. }
        ));
        Ok(())
    }

    #[test]
    fn message_group_id_defaults_when_unset() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars.push((keys::SQS_QUEUE_URL, "https://sqs.example/queue"));
        let config = resolve(vars)?;
        let BroadcasterConfig::Sqs { sqs } = &config.broadcasters[0] else {
            panic!("expected sqs broadcaster");
        };
        assert_eq!(sqs.message_group_id, DEFAULT_MESSAGE_GROUP_ID);
        Ok(())
    }

    #[test]
    fn sqlite_unique_checker_wins_over_db() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars.push((keys::HTTP_ENDPOINT, "https://hooks.example/events"));
        vars.push((keys::SQLITE_UNIQUE_CHECKER_FILE, "/tmp/unique.db"));
        vars.push((keys::DB_UNIQUE_CHECKER_TABLE_NAME, "seen_events"));
        vars.push((keys::UNIQUE_CHECKER_GROUP_ID, "devnet"));
        let config = resolve(vars)?;
        let BroadcasterConfig::Http { http } = &config.broadcasters[0] else {
            panic!("expected http broadcaster");
        };
        assert_eq!(
            http.unique_checker,
            Some(UniqueCheckerConfig::Sqlite {
                sqlite: SqliteUniqueChecker {
                    file: "/tmp/unique.db".to_string(),
                    group_id: Some("devnet".to_string()),
                },
            })
        );
        Ok(())
    }

    #[test]
    fn db_unique_checker_requires_known_connection() {
        let mut vars = minimal_vars();
        vars.push((keys::HTTP_ENDPOINT, "https://hooks.example/events"));
        vars.push((keys::DB_UNIQUE_CHECKER_TABLE_NAME, "seen_events"));
        let err = resolve(vars).unwrap_err();
        match err {
            ConfigError::UnknownConnection {
                section,
                connection,
            } => {
                assert_eq!(section, "unique checker");
                assert_eq!(connection, "db");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn db_settings_with_synthesized_connection_resolve() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars.push((keys::SETTINGS_PROVIDER, "db"));
        vars.push((keys::DB_SETTINGS_TABLE_NAME, "scanner_settings"));
        vars.push((keys::DB_HOST, "db.internal"));
        vars.push((keys::DB_USER, "scanner"));
        vars.push((keys::DB_DATABASE, "chainscan"));
        vars.push((keys::DB_USE_SSL, "RDS"));
        let config = resolve(vars)?;
        assert_eq!(
            config.settings,
            SettingsConfig::Db {
                db: DbSettings {
                    connection: "db".to_string(),
                    table_name: "scanner_settings".to_string(),
                },
            }
        );
        let connection = &config.db_connections["db"];
        assert_eq!(connection.port, 3306);
        assert_eq!(connection.use_ssl, SslMode::RdsManaged);
        Ok(())
    }

    #[test]
    fn db_connections_json_wins_over_flat_variables() -> ConfigResult<()> {
        let mut vars = minimal_vars();
        vars.push((keys::DB_HOST, "ignored.internal"));
        vars.push((
            keys::DB_CONNECTIONS_JSON,
            r#"{"analytics":{"host":"json.internal","user":"scanner","database":"chainscan","useSsl":true}}"#,
        ));
        let config = resolve(vars)?;
        assert_eq!(config.db_connections.len(), 1);
        let connection = &config.db_connections["analytics"];
        assert_eq!(connection.host, "json.internal");
        assert_eq!(connection.use_ssl, SslMode::On);
        Ok(())
    }

    #[test]
    fn aws_config_present_only_with_access_key() -> ConfigResult<()> {
        let config = resolve(minimal_vars())?;
        assert!(config.aws.is_none());

        let mut vars = minimal_vars();
        vars.push((keys::AWS_ACCESS_KEY_ID, "AKIAEXAMPLE"));
        vars.push((keys::AWS_USE_IAM, "TRUE"));
        let config = resolve(vars)?;
        let aws = config.aws.expect("aws config should be present");
        assert!(aws.use_iam);
        assert_eq!(aws.access_key_id, "AKIAEXAMPLE");
        assert_eq!(aws.secret_access_key, "");
        assert_eq!(aws.region, "");
        Ok(())
    }

    #[test]
    fn cloudwatch_metrics_require_namespace_and_env() {
        let mut vars = minimal_vars();
        vars.push((keys::METRICS_PROVIDER, "cloudwatch"));
        let err = resolve(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                name: keys::CLOUDWATCH_METRICS_NAMESPACE,
                ..
            }
        ));

        let mut vars = minimal_vars();
        vars.push((keys::METRICS_PROVIDER, "cloudwatch"));
        vars.push((keys::CLOUDWATCH_METRICS_NAMESPACE, "chainscan"));
        vars.push((keys::CLOUDWATCH_METRICS_ENV, "devnet"));
        let config = resolve(vars).expect("metrics config should resolve");
        assert_eq!(
            config.metrics,
            Some(MetricsConfig::Cloudwatch {
                cloudwatch: CloudwatchMetrics {
                    namespace: "chainscan".to_string(),
                    env_tag: "devnet".to_string(),
                },
            })
        );
    }

    #[test]
    fn unknown_metrics_provider_is_a_named_error() {
        let mut vars = minimal_vars();
        vars.push((keys::METRICS_PROVIDER, "statsd"));
        let err = resolve(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownProvider {
                kind: "metrics provider",
                ..
            }
        ));
    }

    #[test]
    fn invalid_rate_limit_is_rejected() {
        let mut vars = minimal_vars();
        vars.push((keys::MAX_REQUESTS_PER_SECOND, "fast"));
        let err = resolve(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: keys::MAX_REQUESTS_PER_SECOND,
                ..
            }
        ));
    }
}
