//! Unique checkers: dedup tracking preventing re-delivery of an
//! already-broadcast event, optionally scoped by a group id.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chainscan_config::DbConfig;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::connect::{checked_table_name, mysql_connect_options};
use crate::error::{StoreError, StoreResult};

/// Scope recorded when no group id is configured.
const DEFAULT_GROUP: &str = "default";

/// Dedup filter over event keys.
#[async_trait]
pub trait UniqueChecker: Send + Sync {
    /// Record `event_key` for this checker's scope. Returns `true` when the
    /// key was not seen before (the caller should deliver), `false` when it
    /// was (the caller should suppress).
    async fn check_and_mark(&self, event_key: &str) -> StoreResult<bool>;
}

fn group_or_default(group_id: Option<String>) -> String {
    group_id.unwrap_or_else(|| DEFAULT_GROUP.to_string())
}

/// In-process checker; dedup state is lost on restart. Useful for tests and
/// local runs.
#[derive(Debug)]
pub struct MemoryUniqueChecker {
    group: String,
    seen: Mutex<HashSet<String>>,
}

impl MemoryUniqueChecker {
    /// Construct an empty checker for the optional scope.
    #[must_use]
    pub fn new(group_id: Option<String>) -> Self {
        Self {
            group: group_or_default(group_id),
            seen: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl UniqueChecker for MemoryUniqueChecker {
    async fn check_and_mark(&self, event_key: &str) -> StoreResult<bool> {
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(seen.insert(format!("{}:{event_key}", self.group)))
    }
}

/// Single-file local checker keyed by path.
#[derive(Debug)]
pub struct SqliteUniqueChecker {
    pool: SqlitePool,
    group: String,
}

impl SqliteUniqueChecker {
    /// Open (creating if missing) the database file and ensure the tracking
    /// table exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the table cannot
    /// be created.
    pub async fn connect(file: &str, group_id: Option<String>) -> StoreResult<Self> {
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
            "CREATE TABLE IF NOT EXISTS broadcasts \
             (group_id TEXT NOT NULL, event_key TEXT NOT NULL, \
              PRIMARY KEY (group_id, event_key))",
        )
        .execute(&pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "unique.migrate",
            source,
        })?;
        debug!(file, "opened sqlite unique checker");
        Ok(Self {
            pool,
            group: group_or_default(group_id),
        })
    }
}

#[async_trait]
impl UniqueChecker for SqliteUniqueChecker {
    async fn check_and_mark(&self, event_key: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("INSERT OR IGNORE INTO broadcasts (group_id, event_key) VALUES (?, ?)")
                .bind(&self.group)
                .bind(event_key)
                .execute(&self.pool)
                .await
                .map_err(|source| StoreError::Query {
                    operation: "unique.mark",
                    source,
                })?;
        Ok(result.rows_affected() == 1)
    }
}

/// Checker backed by a named database connection and a configured table.
#[derive(Debug)]
pub struct DbUniqueChecker {
    pool: MySqlPool,
    table: String,
    group: String,
}

impl DbUniqueChecker {
    /// Connect to the named database and ensure the tracking table exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the table name is not a plain identifier, the
    /// connection fails, or the table cannot be created.
    pub async fn connect(
        config: &DbConfig,
        table: &str,
        group_id: Option<String>,
    ) -> StoreResult<Self> {
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
             (`group_id` VARCHAR(191) NOT NULL, `event_key` VARCHAR(191) NOT NULL, \
              PRIMARY KEY (`group_id`, `event_key`))"
        ))
        .execute(&pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "unique.migrate",
            source,
        })?;
        debug!(table, "opened db unique checker");
        Ok(Self {
            pool,
            table,
            group: group_or_default(group_id),
        })
    }
}

#[async_trait]
impl UniqueChecker for DbUniqueChecker {
    async fn check_and_mark(&self, event_key: &str) -> StoreResult<bool> {
        let result = sqlx::query(&format!(
            "INSERT IGNORE INTO `{}` (`group_id`, `event_key`) VALUES (?, ?)",
            self.table
        ))
        .bind(&self.group)
        .bind(event_key)
        .execute(&self.pool)
        .await
        .map_err(|source| StoreError::Query {
            operation: "unique.mark",
            source,
        })?;
        Ok(result.rows_affected() == 1)
    }
}
