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

//! Keyed persistence seams for scanner bookkeeping and dedup tracking.
//!
//! Layout: `settings.rs` (`SettingsStore` trait + memory/sqlite/db stores),
//! `unique.rs` (`UniqueChecker` trait + memory/sqlite/db checkers),
//! `connect.rs` (connection-option mapping), `error.rs` (error taxonomy).

pub mod connect;
pub mod error;
pub mod settings;
pub mod unique;

pub use connect::mysql_connect_options;
pub use error::{StoreError, StoreResult};
pub use settings::{DbSettingsStore, MemorySettingsStore, SettingsStore, SqliteSettingsStore};
pub use unique::{DbUniqueChecker, MemoryUniqueChecker, SqliteUniqueChecker, UniqueChecker};
