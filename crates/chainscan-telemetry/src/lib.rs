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

//! Logging installation and the metrics sink seam.
//!
//! Layout: `init.rs` (tracing subscriber setup), `metrics.rs` (`MetricSink`
//! trait + CloudWatch implementation), `error.rs` (error taxonomy).

pub mod error;
pub mod init;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use init::{LogFormat, LoggingConfig, init_logging};
pub use metrics::{CloudWatchMetricSink, MetricSink};
