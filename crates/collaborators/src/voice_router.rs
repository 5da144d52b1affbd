//! `VoiceRouter`: represents `dora-voice-router`'s participant-name-to-voice
//! mapping. The dispatcher itself never classifies voices (§1's explicit
//! non-goal); this trait exists so a host can resolve a [`VoiceId`] for an
//! [`crate::tts::OutgoingSegment`] before handing it to a [`crate::tts::TtsEngine`].

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[async_trait]
pub trait VoiceRouter: Send + Sync {
    async fn route(&self, participant: &str) -> Result<VoiceId, CollaboratorError>;
}

/// In-memory fake backed by a static name-to-voice table, with a
/// configurable fallback for unmapped participants.
#[cfg(any(test, feature = "test-util"))]
pub struct FakeVoiceRouter {
    table: HashMap<String, VoiceId>,
    fallback: Option<VoiceId>,
}

#[cfg(any(test, feature = "test-util"))]
impl FakeVoiceRouter {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            fallback: None,
        }
    }

    pub fn with_mapping(mut self, participant: impl Into<String>, voice: VoiceId) -> Self {
        self.table.insert(participant.into(), voice);
        self
    }

    pub fn with_fallback(mut self, voice: VoiceId) -> Self {
        self.fallback = Some(voice);
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for FakeVoiceRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl VoiceRouter for FakeVoiceRouter {
    async fn route(&self, participant: &str) -> Result<VoiceId, CollaboratorError> {
        if let Some(voice) = self.table.get(participant) {
            return Ok(voice.clone());
        }
        self.fallback
            .clone()
            .ok_or_else(|| CollaboratorError::Unavailable(format!("no voice mapped for participant {participant}")))
    }
}
