//! Error type shared by every collaborator trait in this crate.

use thiserror::Error;

/// Failure returned by a [`crate::tts::TtsEngine`], [`crate::asr::AsrEngine`],
/// [`crate::voice_router::VoiceRouter`], or [`crate::fetcher::ContentFetcher`]
/// implementation.
///
/// This crate never constructs the `Network` or `Unavailable` variants
/// itself — they exist for real bindings (the dora nodes named in
/// `stsd-collaborators`'s module docs) to report through; the fakes here
/// only ever return `Unavailable` when deliberately configured to fail.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator network error: {0}")]
    Network(String),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator rejected input: {0}")]
    InvalidInput(String),
}
