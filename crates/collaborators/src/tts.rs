//! `TtsEngine`: the consumer of `text_segment_<participant>` emissions.
//!
//! Represents a real speech-synthesis binding such as `dora-kokoro-tts` or
//! `dora-primespeech`. This crate ships no networked implementation; a host
//! binary supplies its own [`TtsEngine`] and feeds it emissions read off the
//! dispatcher's output.

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::voice_router::VoiceId;

/// A single bounded slice of text ready for synthesis, paired with the
/// routing decision already made for its participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingSegment {
    pub participant: String,
    pub text: String,
    pub voice: Option<VoiceId>,
}

impl OutgoingSegment {
    pub fn new(participant: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            text: text.into(),
            voice: None,
        }
    }

    pub fn with_voice(mut self, voice: VoiceId) -> Self {
        self.voice = Some(voice);
        self
    }
}

/// Opaque reference to synthesized audio, returned by [`TtsEngine::synthesize`].
/// This crate never inspects the bytes; a real binding's handle would carry
/// a buffer or a stream id instead of this placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    pub id: String,
    pub byte_len: usize,
}

#[async_trait]
pub trait TtsEngine: Send + Sync {
    async fn synthesize(&self, segment: &OutgoingSegment) -> Result<AudioHandle, CollaboratorError>;
}

/// In-memory fake that "synthesizes" by recording the segments it was
/// asked to speak, in order. Used to exercise a full mock pipeline in
/// integration tests without a real audio stack.
#[cfg(any(test, feature = "test-util"))]
pub struct FakeTtsEngine {
    calls: std::sync::Mutex<Vec<OutgoingSegment>>,
    fail_next: std::sync::Mutex<bool>,
}

#[cfg(any(test, feature = "test-util"))]
impl Default for FakeTtsEngine {
    fn default() -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fail_next: std::sync::Mutex::new(false),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl FakeTtsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `synthesize` call return `Err`, once.
    pub fn fail_next_call(&self) {
        *self.fail_next.lock().expect("fake tts mutex poisoned") = true;
    }

    pub fn calls(&self) -> Vec<OutgoingSegment> {
        self.calls.lock().expect("fake tts mutex poisoned").clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl TtsEngine for FakeTtsEngine {
    async fn synthesize(&self, segment: &OutgoingSegment) -> Result<AudioHandle, CollaboratorError> {
        let mut fail = self.fail_next.lock().expect("fake tts mutex poisoned");
        if *fail {
            *fail = false;
            return Err(CollaboratorError::Unavailable("fake tts engine configured to fail".into()));
        }
        drop(fail);
        self.calls
            .lock()
            .expect("fake tts mutex poisoned")
            .push(segment.clone());
        Ok(AudioHandle {
            id: format!("{}-{}", segment.participant, segment.text.len()),
            byte_len: segment.text.len(),
        })
    }
}
