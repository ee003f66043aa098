//! Settings stores: keyed bookkeeping persistence for the scanning engine.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chainscan_config::DbConfig;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::connect::{checked_table_name, mysql_connect_options};
use crate::error::{StoreError, StoreResult};

/// Keyed persistence used by the scanning engine for bookkeeping (e.g. the
/// last-processed block height). Exactly one store is active per process.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the value stored under `name`, if any.
    async fn get(&self, name: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `name`, replacing any previous value.
    async fn put(&self, name: &str, value: &str) -> StoreResult<()>;
}

/// Ephemeral in-process store; the default for local use. Nothing survives
/// a restart.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> StoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Single-file local store keyed by path.
#[derive(Debug)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (creating if missing) the database file and ensure the
    /// bookkeeping table exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the table cannot
    /// be created.
    pub async fn connect(file: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(file)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Connect {
                backend: "sqlite",
                source,
            })?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings (name TEXT PRIMARY KEY, value TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "settings.migrate",
            source,
        })?;
        debug!(file, "opened sqlite settings store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        sqlx::query_scalar("SELECT value FROM settings WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| StoreError::Query {
                operation: "settings.get",
                source,
            })
    }

    async fn put(&self, name: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO settings (name, value) VALUES (?, ?) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        )
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "settings.put",
            source,
        })?;
        Ok(())
    }
}

/// Store backed by a named database connection and a configured table.
#[derive(Debug)]
pub struct DbSettingsStore {
    pool: MySqlPool,
    table: String,
}

impl DbSettingsStore {
    /// Connect to the named database and ensure the bookkeeping table
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the table name is not a plain identifier, the
    /// connection fails, or the table cannot be created.
    pub async fn connect(config: &DbConfig, table: &str) -> StoreResult<Self> {
        let table = checked_table_name(table)?.to_string();
        let pool = MySqlPoolOptions::new()
            .connect_with(mysql_connect_options(config))
            .await
            .map_err(|source| StoreError::Connect {
                backend: "mysql",
                source,
            })?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS `{table}` \
             (`name` VARCHAR(191) PRIMARY KEY, `value` TEXT NOT NULL)"
        ))
        .execute(&pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "settings.migrate",
            source,
        })?;
        debug!(table, "opened db settings store");
        Ok(Self { pool, table })
    }
}

#[async_trait]
impl SettingsStore for DbSettingsStore {
    async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        sqlx::query_scalar(&format!(
            "SELECT `value` FROM `{}` WHERE `name` = ?",
            self.table
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "settings.get",
            source,
        })
    }

    async fn put(&self, name: &str, value: &str) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO `{}` (`name`, `value`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `value` = VALUES(`value`)",
            self.table
        ))
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "settings.put",
            source,
        })?;
        Ok(())
    }
}
