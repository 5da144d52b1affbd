//! Control Handler: global and selective reset (§4.5).

use crate::model::{Participants, SchedulerState};

/// Discards all queues, tail buffers, session markers, and flags across
/// every participant, and resets the global scheduler state.
pub fn global_reset(participants: &mut Participants, state: &mut SchedulerState) {
    participants.clear_all();
    state.active = None;
    state.buffer_paused = false;
    state.fill_percent = 0.0;
}

/// Retains only segments matching `correlation_id` or carrying no
/// correlation id at all; clears tail buffer and `sending` on any
/// participant that had something discarded. Never touches `fill_percent`:
/// the physical audio buffer's fill is unaffected by a selective reset.
pub fn selective_reset(participants: &mut Participants, state: &mut SchedulerState, correlation_id: &str) {
    for p in participants.iter_mut() {
        let before = p.queue.len();
        p.queue
            .retain(|seg| seg.correlation_id.as_deref() == Some(correlation_id) || seg.correlation_id.is_none());
        if p.queue.len() != before {
            p.tail_buffer.clear();
            p.sending = false;
        }
    }
    state.active = None;
    state.buffer_paused = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SessionId, SteppingClock, Clock};

    fn make_segment(text: &str, session: u64, cid: Option<&str>) -> crate::model::Segment {
        crate::model::Segment {
            text: text.to_string(),
            session_id: SessionId(session),
            is_session_start: false,
            is_session_end: false,
            correlation_id: cid.map(|s| s.to_string()),
            status: String::new(),
        }
    }

    #[test]
    fn selective_reset_keeps_matching_and_correlationless_segments() {
        let mut clock = SteppingClock::new();
        let mut participants = Participants::default();
        let pa = participants.get_or_create("pA");
        pa.queue.push_back(make_segment("segX", 1, Some("1")));
        pa.queue.push_back(make_segment("segY", 2, Some("2")));
        pa.queue.push_back(make_segment("segZ", 2, Some("2")));
        pa.tail_buffer.push_str("leftover");
        let pb = participants.get_or_create("pB");
        pb.queue.push_back(make_segment("segW", 3, Some("1")));
        let _ = clock.now();

        let mut state = SchedulerState::default();
        state.active = Some("pA".to_string());

        selective_reset(&mut participants, &mut state, "2");

        let pa = participants.get("pA").unwrap();
        assert_eq!(pa.queue.len(), 2);
        assert_eq!(pa.queue[0].text, "segY");
        assert_eq!(pa.queue[1].text, "segZ");
        assert!(pa.tail_buffer.is_empty());

        let pb = participants.get("pB").unwrap();
        assert!(pb.queue.is_empty());

        assert!(state.active.is_none());
    }

    #[test]
    fn global_reset_clears_everything() {
        let mut participants = Participants::default();
        let pa = participants.get_or_create("pA");
        pa.queue.push_back(make_segment("segX", 1, None));
        let mut state = SchedulerState::default();
        state.active = Some("pA".to_string());
        state.buffer_paused = true;
        state.fill_percent = 80.0;

        global_reset(&mut participants, &mut state);

        assert!(participants.get("pA").unwrap().queue.is_empty());
        assert!(state.active.is_none());
        assert!(!state.buffer_paused);
        assert_eq!(state.fill_percent, 0.0);
    }

    #[test]
    fn two_consecutive_global_resets_are_idempotent() {
        let mut participants = Participants::default();
        let mut state = SchedulerState::default();
        global_reset(&mut participants, &mut state);
        let fill_after_first = state.fill_percent;
        let active_after_first = state.active.clone();
        global_reset(&mut participants, &mut state);
        assert_eq!(state.fill_percent, fill_after_first);
        assert_eq!(state.active, active_after_first);
    }
}
