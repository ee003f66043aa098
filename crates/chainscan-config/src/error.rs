//! Error types for configuration resolution.

use thiserror::Error;

/// Primary error type for configuration resolution.
///
/// Every variant is fatal: resolution either produces a complete
/// [`crate::AppConfig`] or the process terminates with non-zero status.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables were absent.
    #[error("missing required environment variables: {}", names.join(", "))]
    MissingVars {
        /// Names of every missing required variable, in declaration order.
        names: Vec<&'static str>,
    },
    /// A variable required by another variable's selection was absent.
    #[error("{name} is required when {required_by} is set")]
    MissingVar {
        /// Name of the missing variable.
        name: &'static str,
        /// Variable whose value made it required.
        required_by: &'static str,
    },
    /// A variable held a value that does not parse.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending raw value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A provider discriminator named an unrecognised variant.
    #[error("unknown {kind} '{value}'")]
    UnknownProvider {
        /// Discriminator kind (settings provider, metrics provider, ...).
        kind: &'static str,
        /// Offending discriminator value.
        value: String,
    },
    /// A db-backed sub-config referenced a connection name absent from the
    /// connection mapping.
    #[error("{section} references unknown db connection '{connection}'")]
    UnknownConnection {
        /// Sub-config holding the reference.
        section: &'static str,
        /// Connection name that was not found.
        connection: String,
    },
    /// A JSON override variable failed to deserialise.
    #[error("failed to parse {key} as JSON")]
    Json {
        /// Variable name holding the blob.
        key: &'static str,
        /// Source deserialisation error.
        source: serde_json::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
