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

//! Chainscan application bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (boot sequence), `credentials.rs` (cloud
//! credential resolution), `selectors.rs` (store/metric-sink selection),
//! `composer.rs` (broadcaster composition), `engine.rs` (scan-engine seam),
//! `supervisor.rs` (ordered shutdown), `error.rs` (error taxonomy).

/// Application boot sequence.
pub mod bootstrap;
/// Broadcaster composition.
pub(crate) mod composer;
/// Cloud credential resolution and client construction.
pub mod credentials;
/// Scanning engine seam and stub implementation.
pub mod engine;
/// Application error taxonomy.
pub mod error;
/// Provider selection.
pub(crate) mod selectors;
/// Shutdown supervision.
pub mod supervisor;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
