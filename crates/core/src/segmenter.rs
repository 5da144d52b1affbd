//! Segmentation Engine: a stateless function from `(tail_in, new_text)` to
//! `(segments, tail_out)`.
//!
//! Nothing here holds state between calls — the scheduler owns the
//! per-participant tail buffer and passes it in and takes the returned tail
//! back out.

use std::collections::HashSet;

use regex::Regex;

/// Speaker-prefix pattern: a single leading `[Name]` possibly followed by
/// whitespace.
fn speaker_prefix_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[[^\]]+\]\s*").expect("valid speaker prefix regex"))
}

/// Strips a single leading `[Speaker]` tag from `text`, if present.
pub fn strip_speaker_prefix(text: &str) -> String {
    speaker_prefix_re().replace(text, "").into_owned()
}

#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub min_len: usize,
    /// `0` disables length capping, per §4.2's numeric semantics.
    pub max_len: usize,
    pub terminators: HashSet<char>,
    pub fallback_marks: HashSet<char>,
    pub strip_speaker_prefix: bool,
}

impl SegmenterConfig {
    /// `true` when `ch` should be treated as a sentence boundary.
    fn is_terminator(&self, ch: char) -> bool {
        self.terminators.contains(&ch)
    }
}

/// Stripped form of `text` consists solely of whitespace, digits,
/// terminators, and fallback marks — i.e. it carries no speakable content.
pub fn is_skippable(text: &str, config: &SegmenterConfig) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    trimmed.chars().all(|c| {
        c.is_whitespace()
            || c.is_ascii_digit()
            || config.terminators.contains(&c)
            || config.fallback_marks.contains(&c)
    })
}

/// Runs the Segmentation Engine over `tail_in` + `new_text`, returning the
/// ordered list of complete segment texts and the new residual tail.
///
/// Segments returned here are not yet filtered for skippability — per
/// §4.2, that filter is applied by the caller before enqueue, so an empty
/// or punctuation-only input still round-trips through this function
/// unchanged in shape.
pub fn segment(tail_in: &str, new_text: &str, config: &SegmenterConfig) -> (Vec<String>, String) {
    let stripped_new = if config.strip_speaker_prefix {
        strip_speaker_prefix(new_text)
    } else {
        new_text.to_string()
    };
    let combined = format!("{tail_in}{stripped_new}");

    if combined.is_empty() {
        return (Vec::new(), String::new());
    }

    let mut segments = Vec::new();
    let mut accum = String::new();
    let mut run = String::new();
    let mut last_terminator_end = 0usize;
    let mut saw_terminator = false;

    for (byte_idx, ch) in combined.char_indices() {
        run.push(ch);
        if config.is_terminator(ch) {
            saw_terminator = true;
            last_terminator_end = byte_idx + ch.len_utf8();
            let trimmed_run = run.trim().to_string();
            run.clear();
            if trimmed_run.is_empty() {
                continue;
            }
            flush_run(trimmed_run, &mut accum, &mut segments, config);
        }
    }

    if !accum.is_empty() {
        segments.push(accum);
    }

    // Only the leading edge is stripped here: a trailing space in the
    // residual is the natural word separator for whatever text arrives in
    // the next chunk. It is trimmed for real once the tail is actually
    // flushed into a segment (on SESSION_END, or here if it's already
    // skippable/empty).
    let tail_out = if saw_terminator {
        combined[last_terminator_end..].trim_start().to_string()
    } else {
        combined.trim_start().to_string()
    };

    (segments, tail_out)
}

/// Applies one punctuation-delimited run to the running accumulator,
/// flushing into `segments` as needed per §4.2 step 3.
fn flush_run(run: String, accum: &mut String, segments: &mut Vec<String>, config: &SegmenterConfig) {
    let candidate_len = accum.chars().count() + run.chars().count();

    if config.max_len > 0 && candidate_len > config.max_len {
        if !accum.is_empty() {
            segments.push(std::mem::take(accum));
            *accum = run;
        } else {
            segments.extend(split_oversized_run(&run, config));
        }
    } else {
        accum.push_str(&run);
    }
}

/// A single punctuation run exceeds `max_len` on its own. Rather than
/// emitting it whole, look for a cheaper split: the rightmost fallback
/// mark at or before the `max_len`'th character (respecting `min_len` as a
/// lower bound on the first piece), then the nearest whitespace boundary.
/// Mid-word splitting is never performed; if neither split point exists
/// the run is emitted whole.
fn split_oversized_run(run: &str, config: &SegmenterConfig) -> Vec<String> {
    let mut out = Vec::new();
    let mut remaining = run.to_string();

    loop {
        if config.max_len == 0 || remaining.chars().count() <= config.max_len {
            if !remaining.is_empty() {
                out.push(remaining);
            }
            break;
        }

        let chars: Vec<(usize, char)> = remaining.char_indices().collect();
        let max_char_pos = config.max_len.min(chars.len());

        let mut split_at: Option<usize> = None;
        for i in (0..max_char_pos).rev() {
            let (byte_idx, ch) = chars[i];
            if config.fallback_marks.contains(&ch) && i + 1 >= config.min_len {
                split_at = Some(byte_idx + ch.len_utf8());
                break;
            }
        }
        if split_at.is_none() {
            for i in (0..max_char_pos).rev() {
                let (byte_idx, ch) = chars[i];
                if ch.is_whitespace() {
                    split_at = Some(byte_idx);
                    break;
                }
            }
        }

        match split_at {
            Some(idx) if idx > 0 && idx < remaining.len() => {
                let (first, rest) = remaining.split_at(idx);
                out.push(first.trim().to_string());
                remaining = rest.trim_start().to_string();
            }
            _ => {
                out.push(remaining);
                break;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_len: usize, max_len: usize, terminators: &str, fallback: &str) -> SegmenterConfig {
        SegmenterConfig {
            min_len,
            max_len,
            terminators: terminators.chars().collect(),
            fallback_marks: fallback.chars().collect(),
            strip_speaker_prefix: false,
        }
    }

    #[test]
    fn empty_input_returns_empty_tail() {
        let cfg = config(5, 100, ".!?", ",;:");
        let (segs, tail) = segment("", "", &cfg);
        assert!(segs.is_empty());
        assert_eq!(tail, "");
    }

    #[test]
    fn no_terminators_buffers_as_tail() {
        let cfg = config(5, 100, ".!?", ",;:");
        let (segs, tail) = segment("", "hello there", &cfg);
        assert!(segs.is_empty());
        assert_eq!(tail, "hello there");
    }

    #[test]
    fn simple_sentence_split() {
        let cfg = config(5, 100, ".!?", ",;:");
        let (segs, tail) = segment("", "Hello there. This is ", &cfg);
        assert_eq!(segs, vec!["Hello there."]);
        // Trailing space retained: it's the separator for whatever the next
        // chunk brings, trimmed only once the tail is actually flushed.
        assert_eq!(tail, "This is ");
    }

    #[test]
    fn tail_carries_across_chunks() {
        let cfg = config(5, 100, ".!?", ",;:");
        let (segs1, tail1) = segment("", "Hello there. This is ", &cfg);
        assert_eq!(segs1, vec!["Hello there."]);
        let (segs2, tail2) = segment(&tail1, "a test! Final bit", &cfg);
        assert_eq!(segs2, vec!["This is a test!"]);
        assert_eq!(tail2, "Final bit");
    }

    #[test]
    fn max_length_flush_never_exceeds_budget_and_conserves_content() {
        // Commas are genuine terminators here (punctuation mode merges
        // them in), so each comma- or period-delimited run is trimmed
        // before being folded into the running accumulator; runs keep
        // merging into one segment as long as the trimmed total fits
        // within max_len.
        let cfg = config(1, 15, ".!?,", "");
        let (segs, tail) = segment("", "abcdefg, hij, klmnop, qrs.", &cfg);
        assert_eq!(segs, vec!["abcdefg,hij,", "klmnop,qrs."]);
        for s in &segs {
            assert!(s.chars().count() <= 15, "{s} exceeds max_len");
        }
        assert_eq!(tail, "");
    }

    #[test]
    fn speaker_prefix_is_stripped() {
        let mut cfg = config(5, 100, ".!?", ",;:");
        cfg.strip_speaker_prefix = true;
        let (segs, _tail) = segment("", "[Alice] Hello there.", &cfg);
        assert_eq!(segs, vec!["Hello there."]);
    }

    #[test]
    fn punctuation_only_run_is_kept_for_caller_filtering() {
        let cfg = config(5, 100, "。", "");
        let (segs, tail) = segment("", "。。。", &cfg);
        assert_eq!(segs, vec!["。。。"]);
        assert!(is_skippable(&segs[0], &cfg));
        assert_eq!(tail, "");
    }

    #[test]
    fn oversized_run_splits_on_fallback_mark() {
        // "a run, with a comma" has no terminator at all until the final
        // period, so it arrives as one run well past max_len=10.
        let cfg = config(1, 10, ".", ",");
        let (segs, _tail) = segment("", "a run, with a comma.", &cfg);
        assert!(segs.iter().all(|s| s.chars().count() <= 10 || !s.contains(' ')));
        assert!(segs.join("").replace(' ', "").contains("comma"));
    }

    #[test]
    fn is_skippable_digits_and_whitespace() {
        let cfg = config(5, 100, ".!?", ",;:");
        assert!(is_skippable("   123. ", &cfg));
        assert!(!is_skippable("ok.", &cfg));
    }
}
