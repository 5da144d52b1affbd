//! Ingress Demultiplexer: pure port-name classification (§4.1, §4.1.1).
//!
//! This is the part of the ID that does not depend on the scheduler's
//! state at all — classification is purely by port name, so it lives here
//! as free functions the host layer (`stsd-runner`) calls while decoding
//! raw transport records into [`crate::event::IngressEvent`].

/// Reserved port names that are never participant text ports.
pub const RESERVED_PORTS: &[&str] = &["control", "reset", "audio_buffer_control", "audio_complete"];

/// Legacy per-participant acknowledgment port prefix, aliased to
/// `audio_complete` for graphs wired before the shared port existed.
pub const LEGACY_TTS_COMPLETE_PREFIX: &str = "tts_complete_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    /// A participant's own text port; the participant name equals the port name.
    ParticipantText { participant: String },
    /// `audio_complete`, or a legacy `tts_complete_<participant>` alias.
    /// When the latter, the participant name comes from the port itself
    /// rather than event metadata.
    AudioComplete { participant_from_port: Option<String> },
    BufferTelemetry,
    Control,
}

/// Classifies a port name per §4.1's reserved-port rules.
pub fn classify_port(port: &str) -> PortKind {
    match port {
        "audio_complete" => PortKind::AudioComplete {
            participant_from_port: None,
        },
        "audio_buffer_control" => PortKind::BufferTelemetry,
        "control" | "reset" => PortKind::Control,
        other => {
            if let Some(participant) = other.strip_prefix(LEGACY_TTS_COMPLETE_PREFIX) {
                PortKind::AudioComplete {
                    participant_from_port: Some(participant.to_string()),
                }
            } else {
                PortKind::ParticipantText {
                    participant: other.to_string(),
                }
            }
        }
    }
}

/// `true` iff `port` is one of the four reserved non-participant ports, or
/// the legacy `tts_complete_*` alias family.
pub fn is_reserved_port(port: &str) -> bool {
    RESERVED_PORTS.contains(&port) || port.starts_with(LEGACY_TTS_COMPLETE_PREFIX)
}
