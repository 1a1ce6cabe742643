//! Countdown timer service
//!
//! One live countdown per applied effect instance. The service is a
//! plain tick-driven scheduler: the host advances it with elapsed time
//! and receives typed events back, instead of wiring callbacks into
//! each timer.
//!
//! Per-instance ordering guarantees:
//! - tick events come in non-decreasing time order
//! - all ticks strictly precede the single completion event
//! - completion fires at most once; a stopped timer emits nothing

use crate::TimerId;
use indexmap::IndexMap;

/// Configuration for one countdown
#[derive(Debug, Clone)]
pub struct TimerSpec {
    /// Diagnostic label (the effect instance key)
    pub label: String,
    /// Total lifetime in seconds
    pub duration: f64,
    /// Seconds between tick events; `<= 0` disables periodic ticks
    pub tick_interval: f64,
}

impl TimerSpec {
    /// Create a new timer spec
    pub fn new(label: impl Into<String>, duration: f64, tick_interval: f64) -> Self {
        Self {
            label: label.into(),
            duration,
            tick_interval,
        }
    }
}

/// An event emitted by the service while advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    /// Which countdown produced the event
    pub timer: TimerId,
    /// What happened
    pub kind: TimerEventKind,
}

/// Kind of timer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    /// A periodic tick elapsed
    Tick,
    /// The countdown reached its full duration; the timer is destroyed
    Completed,
}

#[derive(Debug, Clone)]
struct LiveTimer {
    label: String,
    duration: f64,
    tick_interval: f64,
    elapsed: f64,
    ticks_emitted: u64,
}

/// Tick-driven countdown scheduler
///
/// Completed timers destroy themselves; `stop` cancels a countdown and
/// all of its future events. Stopping an unknown or already-finished
/// timer is a no-op.
#[derive(Debug, Clone, Default)]
pub struct TimerService {
    live: IndexMap<TimerId, LiveTimer>,
    next_id: u64,
}

impl TimerService {
    /// Create a new service with no live timers
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, returning its handle
    pub fn start(&mut self, spec: TimerSpec) -> TimerId {
        let id = TimerId::new(self.next_id);
        self.next_id += 1;
        self.live.insert(
            id,
            LiveTimer {
                label: spec.label,
                duration: spec.duration,
                tick_interval: spec.tick_interval,
                elapsed: 0.0,
                ticks_emitted: 0,
            },
        );
        id
    }

    /// Cancel a countdown; idempotent
    pub fn stop(&mut self, id: TimerId) {
        self.live.shift_remove(&id);
    }

    /// Check whether a countdown is still live
    pub fn is_running(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Diagnostic label of a live countdown
    pub fn label(&self, id: TimerId) -> Option<&str> {
        self.live.get(&id).map(|t| t.label.as_str())
    }

    /// Number of live countdowns
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Check if no countdowns are live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Advance every live countdown by `dt` seconds
    ///
    /// Tick events fire at the multiples of `tick_interval` strictly
    /// below `duration`; an instant coinciding with expiry belongs to
    /// the completion event. Completed timers are removed before this
    /// returns.
    pub fn advance(&mut self, dt: f64) -> Vec<TimerEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for (&id, timer) in self.live.iter_mut() {
            timer.elapsed += dt;

            if timer.tick_interval > 0.0 {
                loop {
                    let next = (timer.ticks_emitted + 1) as f64 * timer.tick_interval;
                    if next > timer.elapsed || next >= timer.duration {
                        break;
                    }
                    timer.ticks_emitted += 1;
                    events.push(TimerEvent {
                        timer: id,
                        kind: TimerEventKind::Tick,
                    });
                }
            }

            if timer.elapsed >= timer.duration {
                events.push(TimerEvent {
                    timer: id,
                    kind: TimerEventKind::Completed,
                });
                finished.push(id);
            }
        }

        for id in finished {
            self.live.shift_remove(&id);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_for(events: &[TimerEvent], id: TimerId) -> Vec<TimerEventKind> {
        events
            .iter()
            .filter(|e| e.timer == id)
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_ticks_then_completion() {
        let mut timers = TimerService::new();
        let id = timers.start(TimerSpec::new("burn", 3.0, 1.0));

        // ticks land at 1s and 2s; 3s coincides with expiry
        let events = timers.advance(3.0);
        assert_eq!(
            kinds_for(&events, id),
            vec![
                TimerEventKind::Tick,
                TimerEventKind::Tick,
                TimerEventKind::Completed
            ]
        );
        assert!(!timers.is_running(id));
    }

    #[test]
    fn test_fractional_advances_accumulate() {
        let mut timers = TimerService::new();
        let id = timers.start(TimerSpec::new("poison", 2.0, 0.5));

        let mut ticks = 0;
        let mut completed = 0;
        for _ in 0..8 {
            for event in timers.advance(0.25) {
                match event.kind {
                    TimerEventKind::Tick => ticks += 1,
                    TimerEventKind::Completed => completed += 1,
                }
            }
        }

        // ticks at 0.5, 1.0, 1.5; completion at 2.0
        assert_eq!(ticks, 3);
        assert_eq!(completed, 1);
        assert!(!timers.is_running(id));
    }

    #[test]
    fn test_completion_only_without_interval() {
        let mut timers = TimerService::new();
        let id = timers.start(TimerSpec::new("shield", 1.0, 0.0));

        let events = timers.advance(5.0);
        assert_eq!(kinds_for(&events, id), vec![TimerEventKind::Completed]);
    }

    #[test]
    fn test_stop_cancels_future_events() {
        let mut timers = TimerService::new();
        let id = timers.start(TimerSpec::new("burn", 3.0, 1.0));

        timers.stop(id);
        assert!(timers.advance(10.0).is_empty());

        // idempotent, including after natural completion
        timers.stop(id);
        let id2 = timers.start(TimerSpec::new("burn", 1.0, 0.0));
        timers.advance(1.0);
        timers.stop(id2);
    }

    #[test]
    fn test_independent_timers() {
        let mut timers = TimerService::new();
        let short = timers.start(TimerSpec::new("a", 1.0, 0.0));
        let long = timers.start(TimerSpec::new("b", 5.0, 0.0));

        let events = timers.advance(1.0);
        assert_eq!(kinds_for(&events, short), vec![TimerEventKind::Completed]);
        assert!(kinds_for(&events, long).is_empty());
        assert!(timers.is_running(long));
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_labels() {
        let mut timers = TimerService::new();
        let id = timers.start(TimerSpec::new("burn2", 3.0, 1.0));
        assert_eq!(timers.label(id), Some("burn2"));
    }
}
