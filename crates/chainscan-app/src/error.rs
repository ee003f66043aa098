//! # Design
//!
//! - Centralize application-level errors for bootstrap and supervision.
//! - Keep error messages constant while carrying context fields for
//!   debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration resolution failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: chainscan_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: chainscan_telemetry::TelemetryError,
    },
    /// Store operations failed.
    #[error("store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        source: chainscan_store::StoreError,
    },
    /// Broadcaster construction or delivery failed.
    #[error("broadcast operation failed")]
    Broadcast {
        /// Operation identifier.
        operation: &'static str,
        /// Source broadcast error.
        source: chainscan_broadcast::BroadcastError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// Configuration values were invalid.
    #[error("invalid configuration")]
    InvalidConfig {
        /// Field name that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Optional value associated with the failure.
        value: Option<String>,
    },
    /// Every configured broadcaster slot failed to build.
    #[error("no broadcaster could be constructed")]
    NoBroadcaster {
        /// Number of configured slots that failed.
        failed: usize,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: chainscan_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: chainscan_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn store(
        operation: &'static str,
        source: chainscan_store::StoreError,
    ) -> Self {
        Self::Store { operation, source }
    }

    pub(crate) const fn broadcast(
        operation: &'static str,
        source: chainscan_broadcast::BroadcastError,
    ) -> Self {
        Self::Broadcast { operation, source }
    }

    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.resolve",
            chainscan_config::ConfigError::MissingVar {
                name: "SQLITE_SETTINGS_FILE",
                required_by: "settings provider",
            },
        );
        assert!(matches!(config, AppError::Config { .. }));

        let store = AppError::store(
            "settings.connect",
            chainscan_store::StoreError::InvalidTableName {
                table: "drop table".to_string(),
            },
        );
        assert!(matches!(store, AppError::Store { .. }));

        let io = AppError::io("signal.install", io::Error::other("io"));
        assert!(matches!(io, AppError::Io { .. }));
    }
}
