//! Ingress events, emissions, and the outcome of handling one event.

use crate::error::Error;
use crate::model::SessionId;

/// A single inbound event, already classified by port per §4.1.
#[derive(Debug, Clone)]
pub enum IngressEvent {
    /// Text arriving on a participant's own port.
    ParticipantText {
        participant: String,
        text: String,
        /// `"started"`, `"ended"`, or any other string for a mid-session chunk.
        status: String,
        correlation_id: Option<String>,
    },
    /// Downstream acknowledgment that a previously emitted segment was
    /// accepted. `tts_complete_<participant>` legacy ports are normalized
    /// to this variant by the ingress classifier (§4.1.1).
    AudioComplete { participant: String },
    /// Audio playback buffer fill telemetry.
    BufferTelemetry { fill_percent: f64 },
    /// A control-port verb: `"reset"`, `"cancel"`, or `"resume"` (ignored).
    Control {
        verb: String,
        correlation_id: Option<String>,
    },
}

/// An outbound segment destined for `text_segment_<participant>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub participant: String,
    pub text: String,
    pub session_id: SessionId,
    pub correlation_id: Option<String>,
    /// `"started"` on the session's first segment, `"ended"` on its last,
    /// pass-through otherwise.
    pub session_status: String,
    /// Set only in `passthrough` mode: the monotonically increasing index
    /// carried on the companion `status` output port (§4.3.1).
    pub segment_index: Option<u64>,
}

impl Emission {
    /// The logical output port name for this emission, per §6.
    pub fn port(&self) -> String {
        format!("text_segment_{}", self.participant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// Numeric severity, ascending, for threshold comparisons against a
    /// configured `LOG_LEVEL` (§6).
    pub fn severity(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct LogRecord {
    pub node: String,
    pub level: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(node: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            level: level.as_str().to_string(),
            message: message.into(),
        }
    }
}

/// Result of handling one [`IngressEvent`]. Never an `Err` for anything
/// short of a fatal `ConfigError` — see §7 and §7.1.
#[derive(Debug)]
pub enum Outcome {
    /// Zero or more segments were emitted (or no-op state change, e.g. a
    /// reset with nothing downstream to emit yet).
    Emitted(Vec<Emission>),
    /// The event was logged and dropped; the dispatcher's state is
    /// otherwise unchanged.
    Dropped(Error),
    /// The input produced no segments because everything it contained was
    /// filtered by the punctuation-only rule.
    Skipped,
}

impl Outcome {
    pub fn emissions(&self) -> &[Emission] {
        match self {
            Outcome::Emitted(v) => v,
            _ => &[],
        }
    }
}
