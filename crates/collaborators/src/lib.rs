//! Typed trait surfaces for the external systems this repository treats as
//! out of scope (§1, §6.2): TTS engines, ASR, voice routing, and content
//! fetching. None of these traits has a networked implementation here — a
//! host binary plugs in the real bindings (`dora-kokoro-tts`,
//! `dora-primespeech`, `dora-asr`, `dora-voice-router`, an HTTP client for
//! `rss-fetcher`/`link-content-scripter`/`anchor-assigner`) without
//! `stsd-core` or `stsd-runner` ever depending on any of them.
//!
//! Every trait ships an in-memory fake under `#[cfg(any(test, feature =
//! "test-util"))]` for exercising a full mock pipeline in integration tests
//! without a real network or audio stack.

pub mod asr;
pub mod error;
pub mod fetcher;
pub mod tts;
pub mod voice_router;

pub use asr::AsrEngine;
pub use error::CollaboratorError;
pub use fetcher::ContentFetcher;
pub use tts::{AudioHandle, OutgoingSegment, TtsEngine};
pub use voice_router::{VoiceId, VoiceRouter};

#[cfg(any(test, feature = "test-util"))]
pub use asr::FakeAsrEngine;
#[cfg(any(test, feature = "test-util"))]
pub use fetcher::FakeContentFetcher;
#[cfg(any(test, feature = "test-util"))]
pub use tts::FakeTtsEngine;
#[cfg(any(test, feature = "test-util"))]
pub use voice_router::FakeVoiceRouter;
