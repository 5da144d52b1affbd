//! `TracingLogSink`: forwards [`LogRecord`]s through the `tracing` crate's
//! leveled macros so a host embedding `stsd-core` in a larger
//! `tracing`-instrumented service gets the dispatcher's log records folded
//! into its own subscriber, rather than a second competing stdout stream.

use stsd_core::error::Result;
use stsd_core::event::LogRecord;
use stsd_core::logging::LogSink;

/// Target passed to `tracing`'s macros for every record this sink emits.
const TRACING_TARGET: &str = "stsd";

#[derive(Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn emit(&self, record: LogRecord) -> Result<()> {
        match record.level.as_str() {
            "DEBUG" => tracing::debug!(target: TRACING_TARGET, node = %record.node, "{}", record.message),
            "INFO" => tracing::info!(target: TRACING_TARGET, node = %record.node, "{}", record.message),
            "WARNING" => tracing::warn!(target: TRACING_TARGET, node = %record.node, "{}", record.message),
            "ERROR" => tracing::error!(target: TRACING_TARGET, node = %record.node, "{}", record.message),
            _ => tracing::info!(target: TRACING_TARGET, node = %record.node, "{}", record.message),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stsd_core::event::LogLevel;

    #[test]
    fn emit_never_errors_regardless_of_level() {
        let sink = TracingLogSink;
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error] {
            let record = LogRecord::new("test", level, "a message");
            assert!(sink.emit(record).is_ok());
        }
    }
}
