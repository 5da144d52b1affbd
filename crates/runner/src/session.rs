//! Session-style wrapper around a `stsd-core` dispatcher: owns the
//! dispatcher, the channel ingress events arrive on, and the run loop that
//! drains it — the ambient "service shell" layer (config → dispatcher →
//! emissions) described in §2.1 and §5.1.

use crossbeam::channel::{Receiver, Sender};

use stsd_core::config::Config;
use stsd_core::event::{IngressEvent, Outcome};
use stsd_core::logging::{LogSink, NullLogSink};
use stsd_core::model::SystemClock;
use stsd_core::scheduler::Dispatcher;

use crate::logging::TracingLogSink;

/// Default channel capacity for [`DispatcherSession::channel`]. Bounded so a
/// misbehaving ingress source applies backpressure to itself rather than
/// growing an unbounded queue in front of the dispatcher.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Owns a `stsd-core` dispatcher and drives it from a channel of
/// [`IngressEvent`]s. This is the layer a host binary (`stsd-cli`, or a
/// larger embedding service) talks to instead of `stsd_core::Dispatcher`
/// directly.
pub struct DispatcherSession {
    dispatcher: Dispatcher<SystemClock>,
}

impl DispatcherSession {
    /// Builds a session logging through [`TracingLogSink`], matching how a
    /// host already instrumented with `tracing` would want this crate's
    /// records folded into its own subscriber.
    pub fn new(config: Config) -> Self {
        Self::with_log_sink(config, Box::new(TracingLogSink))
    }

    /// Builds a session with an explicit log sink — `NullLogSink` for tests
    /// that only care about emissions, or a host-supplied sink.
    pub fn with_log_sink(config: Config, log: Box<dyn LogSink>) -> Self {
        Self {
            dispatcher: Dispatcher::new(config, log),
        }
    }

    /// Builds a session that discards all log output.
    pub fn silent(config: Config) -> Self {
        Self::with_log_sink(config, Box::new(NullLogSink))
    }

    /// Creates the bounded channel a host's ingress thread should hand
    /// events to [`DispatcherSession::run`] through.
    pub fn channel(capacity: usize) -> (Sender<IngressEvent>, Receiver<IngressEvent>) {
        crossbeam::channel::bounded(capacity)
    }

    /// Handles exactly one event, bypassing the channel — useful for tests
    /// and for hosts that already have their own event loop and just want
    /// the dispatcher's state transition for one event at a time.
    pub fn handle(&mut self, event: IngressEvent) -> Outcome {
        self.dispatcher.handle(event)
    }

    pub fn state(&self) -> &stsd_core::model::SchedulerState {
        self.dispatcher.state()
    }

    /// Blocks on `receiver`, running every event through the dispatcher and
    /// passing the resulting [`Outcome`] to `on_outcome`, until the channel
    /// disconnects (every [`Sender`] has been dropped). Per §5's "only
    /// between events" suspension rule: this loop performs no I/O itself
    /// beyond the blocking `recv`.
    pub fn run(&mut self, receiver: &Receiver<IngressEvent>, mut on_outcome: impl FnMut(Outcome)) {
        while let Ok(event) = receiver.recv() {
            let outcome = self.dispatcher.handle(event);
            on_outcome(outcome);
        }
    }

    /// Async counterpart of [`DispatcherSession::run`], for a host whose
    /// ingress layer is a `tokio::sync::mpsc` channel rather than
    /// `crossbeam`. The dispatcher itself stays synchronous; only the
    /// channel recv is awaited.
    pub async fn run_tokio(
        &mut self,
        receiver: &mut tokio::sync::mpsc::Receiver<IngressEvent>,
        mut on_outcome: impl FnMut(Outcome),
    ) {
        while let Some(event) = receiver.recv().await {
            let outcome = self.dispatcher.handle(event);
            on_outcome(outcome);
        }
    }
}

/// Spawns a background thread that pulls events from `source` and forwards
/// them onto `sender`, stopping when `source` is exhausted or `sender`'s
/// channel disconnects. This is the "optional background thread reading
/// from an external transport" described in §5.1 — the host supplies the
/// transport as an `Iterator<Item = IngressEvent>` (e.g. a line-by-line
/// stdin decoder); this function only owns the forwarding.
pub fn spawn_ingress_forwarder<I>(source: I, sender: Sender<IngressEvent>) -> std::thread::JoinHandle<()>
where
    I: IntoIterator<Item = IngressEvent> + Send + 'static,
{
    std::thread::spawn(move || {
        for event in source {
            if sender.send(event).is_err() {
                break;
            }
        }
    })
}
