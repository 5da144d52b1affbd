//! Session-style wrapper around `stsd-core`: configuration loading, a
//! `tracing`-backed log sink, and a channel-driven run loop (§2.1, §5.1).
//!
//! `stsd-core` itself has no `main` and does no I/O beyond what its caller
//! hands it through `handle()`. This crate is the thin ambient layer a host
//! binary (`stsd-cli`, or a larger embedding service) actually links
//! against: it owns the channel ingress events arrive on, the background
//! thread (or async task) that forwards them from an external transport,
//! and the dispatcher instance itself.

pub mod logging;
pub mod session;

pub use logging::TracingLogSink;
pub use session::{DispatcherSession, spawn_ingress_forwarder, DEFAULT_CHANNEL_CAPACITY};
