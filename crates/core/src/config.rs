//! Configuration: one field per recognized environment-style key (§6),
//! loaded once at startup.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmenterMode {
    Single,
    Conference,
    Passthrough,
    Sequential,
}

impl SegmenterMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "single" => Ok(SegmenterMode::Single),
            "conference" => Ok(SegmenterMode::Conference),
            "passthrough" => Ok(SegmenterMode::Passthrough),
            "sequential" => Ok(SegmenterMode::Sequential),
            other => Err(Error::config(format!("unknown SEGMENTER_MODE: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentMode {
    Sentence,
    Punctuation,
}

impl SegmentMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "sentence" => Ok(SegmentMode::Sentence),
            "punctuation" => Ok(SegmentMode::Punctuation),
            other => Err(Error::config(format!("unknown SEGMENT_MODE: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevelFilter {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevelFilter {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevelFilter::Debug),
            "INFO" => Ok(LogLevelFilter::Info),
            "WARNING" => Ok(LogLevelFilter::Warning),
            "ERROR" => Ok(LogLevelFilter::Error),
            other => Err(Error::config(format!("unknown LOG_LEVEL: {other}"))),
        }
    }

    /// Numeric severity, ascending, matching [`crate::event::LogLevel::severity`].
    pub fn severity(&self) -> u8 {
        match self {
            LogLevelFilter::Debug => 0,
            LogLevelFilter::Info => 1,
            LogLevelFilter::Warning => 2,
            LogLevelFilter::Error => 3,
        }
    }
}

const DEFAULT_PUNCTUATION_MARKS: &str = "。！？.!?";
const DEFAULT_FALLBACK_MARKS: &str = "，,；;：:";

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: SegmenterMode,
    pub min_segment_length: usize,
    pub max_segment_length: usize,
    pub punctuation_marks: String,
    pub segment_mode: SegmentMode,
    pub remove_speaker_id: bool,
    pub enable_backpressure: bool,
    pub audio_buffer_low_water_mark: f64,
    pub audio_buffer_high_water_mark: f64,
    pub log_level: LogLevelFilter,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let map: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&map)
    }

    /// Loads configuration from an explicit key/value map — used by tests
    /// and by hosts that source configuration from something other than
    /// `std::env` (a manifest file, explicit CLI flags).
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mode = match map.get("SEGMENTER_MODE") {
            Some(raw) => SegmenterMode::parse(raw)?,
            None => SegmenterMode::Single,
        };

        let segment_mode = match map.get("SEGMENT_MODE") {
            Some(raw) => SegmentMode::parse(raw)?,
            None => SegmentMode::Sentence,
        };

        let min_segment_length = parse_usize(map, "MIN_SEGMENT_LENGTH", 5)?;

        let default_max = match mode {
            SegmenterMode::Conference | SegmenterMode::Sequential => 15,
            SegmenterMode::Single | SegmenterMode::Passthrough => 100,
        };
        let max_segment_length = parse_max_len(map, "MAX_SEGMENT_LENGTH", default_max)?;

        let punctuation_marks = map
            .get("PUNCTUATION_MARKS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PUNCTUATION_MARKS.to_string());

        let default_remove_speaker_id = matches!(
            mode,
            SegmenterMode::Conference | SegmenterMode::Sequential
        );
        let remove_speaker_id =
            parse_bool(map, "REMOVE_SPEAKER_ID", default_remove_speaker_id)?;

        let enable_backpressure = parse_bool(map, "ENABLE_BACKPRESSURE", true)?;

        let audio_buffer_low_water_mark = parse_f64(map, "AUDIO_BUFFER_LOW_WATER_MARK", 30.0)?;
        let audio_buffer_high_water_mark = parse_f64(map, "AUDIO_BUFFER_HIGH_WATER_MARK", 60.0)?;

        if audio_buffer_low_water_mark >= audio_buffer_high_water_mark {
            return Err(Error::config(format!(
                "AUDIO_BUFFER_LOW_WATER_MARK ({audio_buffer_low_water_mark}) must be less than AUDIO_BUFFER_HIGH_WATER_MARK ({audio_buffer_high_water_mark})"
            )));
        }

        let log_level = match map.get("LOG_LEVEL") {
            Some(raw) => LogLevelFilter::parse(raw)?,
            None => LogLevelFilter::Info,
        };

        Ok(Config {
            mode,
            min_segment_length,
            max_segment_length,
            punctuation_marks,
            segment_mode,
            remove_speaker_id,
            enable_backpressure,
            audio_buffer_low_water_mark,
            audio_buffer_high_water_mark,
            log_level,
        })
    }

    /// Builds the [`crate::segmenter::SegmenterConfig`] this configuration
    /// implies — folding `fallback_marks` into `terminators` when
    /// `SEGMENT_MODE=punctuation`, per §6.
    pub fn segmenter_config(&self) -> crate::segmenter::SegmenterConfig {
        let terminators: HashSet<char> = self.punctuation_marks.chars().collect();
        let fallback_marks: HashSet<char> = DEFAULT_FALLBACK_MARKS.chars().collect();

        let terminators = if self.segment_mode == SegmentMode::Punctuation {
            terminators.union(&fallback_marks).copied().collect()
        } else {
            terminators
        };

        crate::segmenter::SegmenterConfig {
            min_len: self.min_segment_length,
            max_len: self.max_segment_length,
            terminators,
            fallback_marks,
            strip_speaker_prefix: self.remove_speaker_id,
        }
    }
}

fn parse_usize(map: &HashMap<String, String>, key: &str, default: usize) -> Result<usize> {
    match map.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 1)
            .map(|v| v as usize)
            .ok_or_else(|| Error::InvalidNumber {
                key: key.to_string(),
                value: raw.clone(),
            }),
    }
}

/// `MAX_SEGMENT_LENGTH` is special: `0` or negative means "disabled",
/// represented internally as `0`.
fn parse_max_len(map: &HashMap<String, String>, key: &str, default: usize) -> Result<usize> {
    match map.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<i64>()
            .map(|v| if v <= 0 { 0 } else { v as usize })
            .map_err(|_| Error::InvalidNumber {
                key: key.to_string(),
                value: raw.clone(),
            }),
    }
}

fn parse_bool(map: &HashMap<String, String>, key: &str, default: bool) -> Result<bool> {
    match map.get(key) {
        None => Ok(default),
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::InvalidNumber {
                key: key.to_string(),
                value: raw.clone(),
            }),
        },
    }
}

fn parse_f64(map: &HashMap<String, String>, key: &str, default: f64) -> Result<f64> {
    match map.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<f64>().map_err(|_| Error::InvalidNumber {
            key: key.to_string(),
            value: raw.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_for_single_mode() {
        let cfg = Config::from_map(&map(&[])).unwrap();
        assert_eq!(cfg.mode, SegmenterMode::Single);
        assert_eq!(cfg.max_segment_length, 100);
        assert!(!cfg.remove_speaker_id);
    }

    #[test]
    fn defaults_for_conference_mode() {
        let cfg = Config::from_map(&map(&[("SEGMENTER_MODE", "conference")])).unwrap();
        assert_eq!(cfg.max_segment_length, 15);
        assert!(cfg.remove_speaker_id);
    }

    #[test]
    fn inverted_watermarks_is_config_error() {
        let result = Config::from_map(&map(&[
            ("AUDIO_BUFFER_LOW_WATER_MARK", "70"),
            ("AUDIO_BUFFER_HIGH_WATER_MARK", "60"),
        ]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn unknown_mode_is_config_error() {
        let result = Config::from_map(&map(&[("SEGMENTER_MODE", "bogus")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn unparseable_numeric_env_is_rejected() {
        let result = Config::from_map(&map(&[("MIN_SEGMENT_LENGTH", "not-a-number")]));
        assert!(result.is_err());
    }

    #[test]
    fn max_len_zero_disables_cap() {
        let cfg = Config::from_map(&map(&[("MAX_SEGMENT_LENGTH", "0")])).unwrap();
        assert_eq!(cfg.max_segment_length, 0);
    }
}
