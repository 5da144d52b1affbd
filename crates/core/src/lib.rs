//! Streaming Text Segmenter & Dispatcher core.
//!
//! This crate is the single-threaded, synchronous dispatcher described in
//! the component design: an Ingress Demultiplexer, a stateless Segmentation
//! Engine, a Session-FIFO Scheduler, and a Backpressure Gate, wired
//! together in [`scheduler::Dispatcher`]. It owns no I/O — callers push
//! [`event::IngressEvent`]s in and read back [`event::Outcome`]s.

pub mod backpressure;
pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod ingress;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod segmenter;

pub use config::{Config, SegmenterMode};
pub use error::{Error, Result};
pub use event::{Emission, IngressEvent, LogLevel, LogRecord, Outcome};
pub use scheduler::Dispatcher;
