//! Backpressure Gate: hysteresis over the audio buffer fill percentage (§4.4).
//!
//! Pure state transition logic, kept separate from the scheduler so the
//! watermark hysteresis itself is unit-testable without a full dispatcher.

use crate::model::SchedulerState;

#[derive(Debug, Clone, Copy)]
pub struct Watermarks {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    PausedNow,
    ResumedNow,
}

/// Applies one `BufferTelemetry` reading to `state`, returning whether a
/// pause/resume edge was crossed.
pub fn observe(state: &mut SchedulerState, fill_percent: f64, watermarks: &Watermarks) -> Transition {
    state.fill_percent = fill_percent;

    if fill_percent > watermarks.high && !state.buffer_paused {
        state.buffer_paused = true;
        return Transition::PausedNow;
    }
    if fill_percent < watermarks.low && state.buffer_paused {
        state.buffer_paused = false;
        return Transition::ResumedNow;
    }
    Transition::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks() -> Watermarks {
        Watermarks { low: 30.0, high: 60.0 }
    }

    #[test]
    fn pauses_above_high_watermark() {
        let mut state = SchedulerState::default();
        assert_eq!(observe(&mut state, 70.0, &marks()), Transition::PausedNow);
        assert!(state.buffer_paused);
    }

    #[test]
    fn stays_paused_between_watermarks() {
        let mut state = SchedulerState::default();
        observe(&mut state, 70.0, &marks());
        assert_eq!(observe(&mut state, 45.0, &marks()), Transition::None);
        assert!(state.buffer_paused);
    }

    #[test]
    fn resumes_below_low_watermark() {
        let mut state = SchedulerState::default();
        observe(&mut state, 70.0, &marks());
        assert_eq!(observe(&mut state, 25.0, &marks()), Transition::ResumedNow);
        assert!(!state.buffer_paused);
    }

    #[test]
    fn no_transition_when_already_unpaused_and_falling() {
        let mut state = SchedulerState::default();
        assert_eq!(observe(&mut state, 10.0, &marks()), Transition::None);
        assert!(!state.buffer_paused);
    }
}
