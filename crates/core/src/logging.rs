//! Structured log sink.
//!
//! Logging is a side channel: it must never block or reorder event
//! processing (§9). Sinks are invoked synchronously from the handler that
//! produced the record; a sink failure is swallowed rather than propagated
//! into the dispatcher's control flow.

use std::io::Write;
use std::sync::Mutex;

use crate::error::Result;
use crate::event::LogRecord;

pub trait LogSink: Send + Sync {
    fn emit(&self, record: LogRecord) -> Result<()>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// JSONL sink writing `{node, level, message}` records to any writer.
pub struct TerminalLogSink<W: Write + Send + Sync> {
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> TerminalLogSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl TerminalLogSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + Sync> LogSink for TerminalLogSink<W> {
    fn emit(&self, record: LogRecord) -> Result<()> {
        let line = serde_json::to_string(&record)?;
        let mut writer = self
            .writer
            .lock()
            .expect("terminal log sink mutex poisoned");
        writeln!(writer, "{line}").map_err(|e| crate::error::Error::transient_emit("log", e.to_string()))?;
        writer.flush().ok();
        Ok(())
    }
}

/// Fans a record out to every sink it holds.
#[derive(Default)]
pub struct MultiLogSink {
    sinks: Vec<Box<dyn LogSink>>,
}

impl MultiLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.push(sink);
    }
}

impl LogSink for MultiLogSink {
    fn emit(&self, record: LogRecord) -> Result<()> {
        for sink in &self.sinks {
            // A broken sink must never stall or crash the dispatcher.
            let _ = sink.emit(record.clone());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        for sink in &self.sinks {
            let _ = sink.close();
        }
        Ok(())
    }
}

/// Sink that discards every record. Used as the default when a host does
/// not care about log output, and in tests.
#[derive(Debug, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn emit(&self, _record: LogRecord) -> Result<()> {
        Ok(())
    }
}
