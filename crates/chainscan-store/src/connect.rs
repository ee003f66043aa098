//! Mapping from resolved connection config to driver options.

use chainscan_config::{DbConfig, SslMode};
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};

use crate::error::{StoreError, StoreResult};

/// Build driver options for a named connection.
#[must_use]
pub fn mysql_connect_options(config: &DbConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.database)
        .ssl_mode(ssl_mode(config.use_ssl));
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    options
}

/// The managed-certificate mode still requires TLS; the provider's bundle
/// rides the platform trust store.
const fn ssl_mode(mode: SslMode) -> MySqlSslMode {
    match mode {
        SslMode::Off => MySqlSslMode::Disabled,
        SslMode::On | SslMode::RdsManaged => MySqlSslMode::Required,
    }
}

/// Reject table names that are not plain identifiers. Table names are the
/// one configured value interpolated into SQL text, so they are restricted
/// to `[A-Za-z0-9_]`.
pub(crate) fn checked_table_name(table: &str) -> StoreResult<&str> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(table)
    } else {
        Err(StoreError::InvalidTableName {
            table: table.to_string(),
        })
    }
}
