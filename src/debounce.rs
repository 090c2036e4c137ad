//! Coalescing of motion detections into rate-limited announcements.
//!
//! Two independent inputs drive the aggregator:
//! - `ingest` runs on every sampled frame and can only *raise* the pending flag.
//! - `check` runs on the slower dispatch timer and is the only place the flag is cleared,
//!   at the moment an announcement goes out.
//!
//! A burst of detections followed by quiet frames therefore still yields exactly one
//! announcement, and two announcements are always more than `interval` apart.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::announce::AnnouncementSink;
use crate::classification::ClassificationResult;
use crate::message::AnnouncementMessage;

/// Mutable debounce bookkeeping for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceState {
    /// A detection arrived since the last announcement.
    pub motion_pending: bool,

    /// When the last announcement went out; `None` before the first one.
    pub last_announced_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct DebounceAggregator {
    interval: Duration,
    state: DebounceState,
}

impl DebounceAggregator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: DebounceState::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.motion_pending
    }

    /// Record one frame's classification.
    ///
    /// Only `MotionDetected` has an effect; other results never clear a pending detection.
    pub fn ingest(&mut self, result: ClassificationResult) {
        if result.is_motion() && !self.state.motion_pending {
            trace!("motion pending");
            self.state.motion_pending = true;
        }
    }

    /// Whether an announcement may go out at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        if !self.state.motion_pending {
            return false;
        }
        match self.state.last_announced_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.interval,
        }
    }

    /// Dispatch-check tick: announce through `sink` if a detection is pending and the window
    /// since the previous announcement has elapsed.
    ///
    /// Returns `true` if an announcement was dispatched. A pending detection that is not yet
    /// due stays pending for the next check.
    pub fn check<K>(&mut self, now: Instant, sink: &K, message: &AnnouncementMessage) -> bool
    where
        K: AnnouncementSink + ?Sized,
    {
        if !self.is_due(now) {
            return false;
        }

        sink.announce(message.as_str());
        self.state.last_announced_at = Some(now);
        self.state.motion_pending = false;
        debug!(message = message.as_str(), "announcement dispatched");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use ClassificationResult::{MotionDetected, NoMotion, NotReady};

    #[derive(Default)]
    struct CountingSink {
        calls: Mutex<Vec<String>>,
    }

    impl CountingSink {
        fn count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }
    }

    impl AnnouncementSink for CountingSink {
        fn announce(&self, message: &str) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(message.to_owned());
            }
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn not_ready_and_no_motion_never_raise_the_flag() {
        let mut agg = DebounceAggregator::new(ms(1000));
        agg.ingest(NotReady);
        agg.ingest(NoMotion);
        assert!(!agg.is_pending());
    }

    #[test]
    fn quiet_frames_do_not_clear_a_pending_detection() {
        let mut agg = DebounceAggregator::new(ms(1000));
        agg.ingest(MotionDetected);
        agg.ingest(NoMotion);
        agg.ingest(NotReady);
        assert!(agg.is_pending());
    }

    #[test]
    fn first_detection_is_announced_immediately() {
        let t0 = Instant::now();
        let sink = CountingSink::default();
        let message = AnnouncementMessage::default();
        let mut agg = DebounceAggregator::new(ms(1000));

        assert!(!agg.check(t0, &sink, &message));
        agg.ingest(MotionDetected);
        assert!(agg.check(t0, &sink, &message));
        assert!(!agg.is_pending());
        assert_eq!(agg.state().last_announced_at, Some(t0));
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn detections_inside_the_window_are_deferred_not_dropped() {
        let t0 = Instant::now();
        let sink = CountingSink::default();
        let message = AnnouncementMessage::default();
        let mut agg = DebounceAggregator::new(ms(1000));

        agg.ingest(MotionDetected);
        assert!(agg.check(t0, &sink, &message));

        agg.ingest(MotionDetected);
        assert!(!agg.check(t0 + ms(500), &sink, &message));
        // Exactly at the boundary is still inside the window.
        assert!(!agg.check(t0 + ms(1000), &sink, &message));
        assert!(agg.is_pending());

        assert!(agg.check(t0 + ms(1100), &sink, &message));
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn announcements_carry_the_configured_message() {
        let sink = CountingSink::default();
        let message = AnnouncementMessage::new("Someone is at the door");
        let mut agg = DebounceAggregator::new(ms(1000));

        agg.ingest(MotionDetected);
        agg.check(Instant::now(), &sink, &message);

        let calls = sink.calls.lock().map(|c| c.clone()).unwrap_or_default();
        assert_eq!(calls, vec!["Someone is at the door".to_owned()]);
    }

    #[test]
    fn announcement_gaps_always_exceed_the_interval() {
        let t0 = Instant::now();
        let sink = CountingSink::default();
        let message = AnnouncementMessage::default();
        let mut agg = DebounceAggregator::new(ms(300));
        let mut dispatched = Vec::new();

        // Motion on every frame, checks every 100ms for 3s.
        for step in 0..30u64 {
            agg.ingest(MotionDetected);
            let now = t0 + ms(step * 100);
            if agg.check(now, &sink, &message) {
                dispatched.push(now);
            }
        }

        assert!(dispatched.len() > 1);
        for pair in dispatched.windows(2) {
            assert!(pair[1] - pair[0] > ms(300));
        }
    }
}
