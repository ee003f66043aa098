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

//! Event broadcaster sinks and composition primitives.
//!
//! A sink publishes one scanned event to an external channel (operator log,
//! HTTP endpoint, queue, topic) and resolves once the event is delivered or
//! queued. Each sink owns its own delivery resilience; retries live in the
//! transport collaborators, never here.
//!
//! Layout: `event.rs` (event model), `sink.rs` (`EventSink` trait),
//! `console.rs`/`http.rs`/`sqs.rs`/`sns.rs` (concrete sinks),
//! `multicast.rs` (fan-out), `unique.rs` (dedup decorator), `error.rs`
//! (error taxonomy).

pub mod console;
pub mod error;
pub mod event;
pub mod http;
pub mod multicast;
pub mod sink;
pub mod sns;
pub mod sqs;
pub mod unique;

pub use console::ConsoleSink;
pub use error::{BroadcastError, BroadcastResult};
pub use event::ScannedEvent;
pub use http::HttpSink;
pub use multicast::MulticastSink;
pub use sink::EventSink;
pub use sns::SnsSink;
pub use sqs::SqsSink;
pub use unique::UniqueSink;
