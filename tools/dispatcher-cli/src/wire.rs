//! Newline-delimited JSON wire format read from stdin and written to
//! stdout, per §6's event ports.

use serde::{Deserialize, Serialize};

use stsd_core::error::Error;
use stsd_core::event::{Emission, IngressEvent};
use stsd_core::ingress::{classify_port, PortKind};

/// One line of ingress JSON. Which fields matter depends on which
/// reserved port (or participant port) `port` classifies to.
#[derive(Debug, Deserialize)]
pub struct RawIngressLine {
    pub port: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub participant: Option<String>,
    #[serde(default)]
    pub fill_percent: Option<f64>,
    #[serde(default)]
    pub buffer_percentage: Option<f64>,
    #[serde(default)]
    pub verb: Option<String>,
}

impl RawIngressLine {
    fn correlation(&self) -> Option<String> {
        self.correlation_id.clone().or_else(|| self.question_id.clone())
    }
}

/// Classifies one decoded JSON line into a [`IngressEvent`], per §4.1's
/// port-name classification rules. Returns a [`Error::Protocol`] for lines
/// this CLI cannot turn into a well-formed event (e.g. `audio_complete`
/// with no resolvable participant).
pub fn decode(raw: RawIngressLine) -> Result<IngressEvent, Error> {
    match classify_port(&raw.port) {
        PortKind::ParticipantText { participant } => Ok(IngressEvent::ParticipantText {
            participant,
            text: raw.text.unwrap_or_default(),
            status: raw.status.unwrap_or_else(|| "chunk".to_string()),
            correlation_id: raw.correlation(),
        }),
        PortKind::AudioComplete { participant_from_port } => {
            let participant = participant_from_port.or(raw.participant).ok_or_else(|| {
                Error::protocol("audio_complete event missing participant", None)
            })?;
            Ok(IngressEvent::AudioComplete { participant })
        }
        PortKind::BufferTelemetry => {
            let fill = raw
                .fill_percent
                .or(raw.buffer_percentage)
                .ok_or_else(|| Error::protocol("audio_buffer_control event missing fill percent", None))?;
            Ok(IngressEvent::BufferTelemetry { fill_percent: fill })
        }
        PortKind::Control => Ok(IngressEvent::Control {
            verb: raw.verb.unwrap_or_default(),
            correlation_id: raw.correlation(),
        }),
    }
}

/// One emitted segment, serialized for the `text_segment_<participant>`
/// port (§6's outputs).
#[derive(Debug, Serialize)]
pub struct EmissionLine {
    pub port: String,
    pub text: String,
    pub session_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub session_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u64>,
}

impl From<&Emission> for EmissionLine {
    fn from(emission: &Emission) -> Self {
        Self {
            port: emission.port(),
            text: emission.text.clone(),
            session_id: emission.session_id.0,
            correlation_id: emission.correlation_id.clone(),
            session_status: emission.session_status.clone(),
            segment_index: emission.segment_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(json: &str) -> RawIngressLine {
        serde_json::from_str(json).expect("valid test json")
    }

    #[test]
    fn decodes_participant_text() {
        let raw = line(r#"{"port":"p1","status":"started","text":"hello"}"#);
        let event = decode(raw).unwrap();
        assert!(matches!(event, IngressEvent::ParticipantText { participant, .. } if participant == "p1"));
    }

    #[test]
    fn decodes_audio_complete_from_metadata() {
        let raw = line(r#"{"port":"audio_complete","participant":"p1"}"#);
        let event = decode(raw).unwrap();
        assert!(matches!(event, IngressEvent::AudioComplete { participant } if participant == "p1"));
    }

    #[test]
    fn decodes_legacy_tts_complete_alias() {
        let raw = line(r#"{"port":"tts_complete_p1"}"#);
        let event = decode(raw).unwrap();
        assert!(matches!(event, IngressEvent::AudioComplete { participant } if participant == "p1"));
    }

    #[test]
    fn audio_complete_without_participant_is_protocol_error() {
        let raw = line(r#"{"port":"audio_complete"}"#);
        assert!(decode(raw).is_err());
    }

    #[test]
    fn decodes_buffer_telemetry_from_either_field() {
        let raw = line(r#"{"port":"audio_buffer_control","fill_percent":70.0}"#);
        let event = decode(raw).unwrap();
        assert!(matches!(event, IngressEvent::BufferTelemetry { fill_percent } if fill_percent == 70.0));

        let raw = line(r#"{"port":"audio_buffer_control","buffer_percentage":25.0}"#);
        let event = decode(raw).unwrap();
        assert!(matches!(event, IngressEvent::BufferTelemetry { fill_percent } if fill_percent == 25.0));
    }

    #[test]
    fn decodes_control_with_question_id_alias() {
        let raw = line(r#"{"port":"reset","verb":"reset","question_id":"q1"}"#);
        let event = decode(raw).unwrap();
        assert!(matches!(event, IngressEvent::Control { verb, correlation_id } if verb == "reset" && correlation_id.as_deref() == Some("q1")));
    }

    #[test]
    fn emission_line_carries_port_and_session_id() {
        let emission = Emission {
            participant: "p1".to_string(),
            text: "hi".to_string(),
            session_id: stsd_core::model::SessionId(3),
            correlation_id: None,
            session_status: "started".to_string(),
            segment_index: None,
        };
        let line = EmissionLine::from(&emission);
        assert_eq!(line.port, "text_segment_p1");
        assert_eq!(line.session_id, 3);
    }
}
