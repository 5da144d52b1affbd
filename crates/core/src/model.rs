//! Core data model: participants, sessions, segments.
//!
//! These are plain owned structs — there is exactly one implementation of
//! each entity, so no trait objects are needed here.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Monotonic source of timestamps used for session arrival ordering.
///
/// A trait rather than a direct call to `Instant::now()` so scenario tests
/// can assign deterministic timestamps without sleeping real time.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

/// Clock backed by the real monotonic OS clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Clock that hands out strictly increasing fake instants, one tick per
/// call, with no dependence on wall-clock time passing.
#[derive(Debug)]
pub struct SteppingClock {
    base: Instant,
    ticks: u64,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            ticks: 0,
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SteppingClock {
    fn now(&mut self) -> Instant {
        self.ticks += 1;
        self.base + std::time::Duration::from_nanos(self.ticks)
    }
}

/// Fresh, process-lifetime-unique session id minted from a monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// A pending or in-flight session on one participant's timeline.
#[derive(Debug, Clone)]
pub struct SessionMarker {
    pub id: SessionId,
    pub arrival: Instant,
    pub correlation_id: Option<String>,
    pub status: String,
}

/// A bounded slice of text cut at punctuation or length limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub session_id: SessionId,
    /// `true` on the first segment emitted for this session — drives the
    /// `session_status="started"` metadata on emission.
    pub is_session_start: bool,
    /// `true` on the last segment of this session — drives
    /// `session_status="ended"`.
    pub is_session_end: bool,
    pub correlation_id: Option<String>,
    /// The original chunk's `session_status` value, carried forward as
    /// emission metadata when this segment is neither the first nor last
    /// of its session.
    pub status: String,
}

/// Per-participant state: tail buffer, queue, session timeline, flags.
#[derive(Debug)]
pub struct Participant {
    pub name: String,
    pub tail_buffer: String,
    pub queue: VecDeque<Segment>,
    pub sessions: VecDeque<SessionMarker>,
    pub current_session_id: Option<SessionId>,
    pub sending: bool,
    pub last_end_sent: bool,
    /// Set on SESSION_START, cleared the moment the next segment is
    /// enqueued — marks which segment gets `is_session_start=true`.
    pub awaiting_first_segment: bool,
    /// Order in which the dispatcher first observed this participant's
    /// port, used only by `sequential` mode's election tie-break.
    pub discovery_order: u64,
}

impl Participant {
    pub fn new(name: impl Into<String>, discovery_order: u64) -> Self {
        Self {
            name: name.into(),
            tail_buffer: String::new(),
            queue: VecDeque::new(),
            sessions: VecDeque::new(),
            current_session_id: None,
            sending: false,
            last_end_sent: false,
            awaiting_first_segment: false,
            discovery_order,
        }
    }

    /// Whether this participant is currently a candidate for election:
    /// it has a pending session *and* either a non-empty queue or its
    /// oldest pending session is known to have produced no segments.
    pub fn is_election_candidate(&self) -> bool {
        match self.sessions.front() {
            None => false,
            Some(_) => !self.queue.is_empty() || self.head_session_is_empty(),
        }
    }

    /// `true` when the oldest pending session has ended and left nothing
    /// in the queue belonging to it — an "empty session" per §4.3.
    pub(crate) fn head_session_is_empty(&self) -> bool {
        let Some(head) = self.sessions.front() else {
            return false;
        };
        // If the current_session_id still equals the head session, it
        // hasn't ended yet, so it can't be known-empty.
        if self.current_session_id == Some(head.id) {
            return false;
        }
        !self.queue.iter().any(|seg| seg.session_id == head.id)
    }

    pub fn clear(&mut self) {
        self.tail_buffer.clear();
        self.queue.clear();
        self.sessions.clear();
        self.current_session_id = None;
        self.sending = false;
        self.last_end_sent = false;
        self.awaiting_first_segment = false;
    }
}

/// Process-lifetime scheduler state shared across all participants.
#[derive(Debug, Default)]
pub struct SchedulerState {
    pub active: Option<String>,
    pub buffer_paused: bool,
    pub fill_percent: f64,
}

/// Registry of participants, keyed by port/participant name, with
/// insertion-order discovery tracking for `sequential` mode.
#[derive(Debug, Default)]
pub struct Participants {
    by_name: HashMap<String, Participant>,
    next_discovery_order: u64,
}

impl Participants {
    pub fn get_or_create(&mut self, name: &str) -> &mut Participant {
        if !self.by_name.contains_key(name) {
            let order = self.next_discovery_order;
            self.next_discovery_order += 1;
            self.by_name
                .insert(name.to_string(), Participant::new(name, order));
        }
        self.by_name.get_mut(name).expect("just inserted")
    }

    pub fn get(&self, name: &str) -> Option<&Participant> {
        self.by_name.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Participant> {
        self.by_name.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.by_name.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.by_name.values_mut()
    }

    pub fn clear_all(&mut self) {
        for p in self.by_name.values_mut() {
            p.clear();
        }
    }
}
