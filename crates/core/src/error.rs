//! Error taxonomy for the dispatcher.
//!
//! Only [`Error::Config`] is fatal. Everything else the dispatcher produces
//! is folded into an [`Outcome`](crate::event::Outcome) and logged rather
//! than returned as an `Err` — event handlers never raise across event
//! boundaries.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unparseable numeric env, inverted watermarks, unknown mode. Fatal at startup.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Logged, event dropped: malformed or out-of-protocol input.
    #[error("protocol error: {reason}")]
    Protocol {
        reason: String,
        participant: Option<String>,
    },

    /// Logged, state preserved: downstream emit refused. The segment stays
    /// logically in-flight; the STSD does not retry it itself.
    #[error("transient emit error on {port}: {reason}")]
    TransientEmit { port: String, reason: String },

    #[error("invalid numeric value {value:?} for {key}")]
    InvalidNumber { key: String, value: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn protocol(reason: impl Into<String>, participant: Option<&str>) -> Self {
        Error::Protocol {
            reason: reason.into(),
            participant: participant.map(|s| s.to_string()),
        }
    }

    pub fn transient_emit(port: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::TransientEmit {
            port: port.into(),
            reason: reason.into(),
        }
    }

    /// `true` for variants that should terminate the process, per §7's
    /// "log and terminate" policy for ConfigError.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}
