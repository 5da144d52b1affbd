//! `AsrEngine`: represents `dora-asr`, upstream of this dispatcher and never
//! invoked by it. Modeled here only so a host wiring a full conversational
//! pipeline has one place to plug in a real transcription binding alongside
//! the dispatcher's own collaborator traits.

use async_trait::async_trait;

use crate::error::CollaboratorError;

#[async_trait]
pub trait AsrEngine: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, CollaboratorError>;
}

/// In-memory fake returning a fixed transcript regardless of input, or a
/// configured failure.
#[cfg(any(test, feature = "test-util"))]
pub struct FakeAsrEngine {
    transcript: String,
}

#[cfg(any(test, feature = "test-util"))]
impl FakeAsrEngine {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl AsrEngine for FakeAsrEngine {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, CollaboratorError> {
        if audio.is_empty() {
            return Err(CollaboratorError::InvalidInput("empty audio buffer".into()));
        }
        Ok(self.transcript.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_asr_returns_fixed_transcript() {
        let engine = FakeAsrEngine::new("hello there");
        let out = engine.transcribe(&[1, 2, 3]).await.unwrap();
        assert_eq!(out, "hello there");
    }

    #[tokio::test]
    async fn fake_asr_rejects_empty_audio() {
        let engine = FakeAsrEngine::new("hello there");
        assert!(engine.transcribe(&[]).await.is_err());
    }
}
