#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Environment-backed configuration resolution for the chainscan daemon.
//!
//! Layout: `model.rs` (typed, immutable config models with tagged-union
//! sub-configs), `parse.rs` (shared parse helpers), `resolver.rs`
//! (environment snapshot + resolution), `error.rs` (error taxonomy).

pub mod error;
pub mod model;
pub mod parse;
pub mod resolver;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    AppConfig, AwsConfig, BroadcasterConfig, DbConfig, HttpConfig, LogFormat, MetricsConfig,
    SettingsConfig, SnsConfig, SqsConfig, SslMode, UniqueCheckerConfig,
};
pub use resolver::{Vars, keys};
