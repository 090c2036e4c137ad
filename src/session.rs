//! High-level entry point wiring the whole pipeline together.
//!
//! A [`Session`] owns every piece of mutable state for one running feed: the sampler and its
//! capture surface, the classifier, the debounce bookkeeping, and the status display. Nothing
//! lives in globals, so a test can build a session from fakes and drive it tick by tick.
//!
//! [`Session::run`] drives two periodic timers from a single task:
//! - the sampling timer (default 30 Hz) captures, classifies, updates the status display, and
//!   feeds the debounce aggregator;
//! - the dispatch timer (default 10 Hz) decides whether an announcement is due.
//!
//! Both timers are polled by one `select!` loop, so each callback runs to completion before the
//! other starts and the debounce state needs no lock. Late ticks are skipped rather than
//! replayed in a burst.

use std::future::Future;
use std::pin::pin;

use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::announce::AnnouncementSink;
use crate::classifier::Classifier;
use crate::debounce::DebounceAggregator;
use crate::frame::FrameBuffer;
use crate::message::AnnouncementMessage;
use crate::opts::Opts;
use crate::sampler::{FrameSampler, TickOutcome};
use crate::source::FrameSource;
use crate::status::{StatusDisplay, StatusSurface};
use crate::{Error, Result};

/// Counters describing what a session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Frames captured and classified.
    pub frames_sampled: u64,
    /// Sampling ticks skipped because a handle was missing.
    pub idle_ticks: u64,
    /// Sampling ticks skipped because the source had no new frame.
    ///
    /// Diagnostic only: a no-data tick leaves the sampler, debounce state and status display
    /// untouched.
    pub no_data_ticks: u64,
    /// Sampling ticks abandoned on a capture or classification error.
    pub abandoned_ticks: u64,
    /// Frames classified as motion.
    pub motion_frames: u64,
    /// Announcements dispatched.
    pub announcements: u64,
}

pub struct Session<C, S> {
    opts: Opts,
    message: AnnouncementMessage,
    sampler: FrameSampler<C, S>,
    debounce: DebounceAggregator,
    display: Option<StatusDisplay<Box<dyn StatusSurface>>>,
    sink: Box<dyn AnnouncementSink>,
    stats: SessionStats,
    source_ended: bool,
}

impl<C: Classifier, S: FrameSource> Session<C, S> {
    /// Create a session reading from `source` and announcing through `sink`.
    ///
    /// The classifier is attached later, either by [`Session::run`]'s loader or
    /// [`Session::attach_classifier`]; until then sampling ticks are no-ops.
    pub fn new<K>(opts: Opts, message: AnnouncementMessage, source: S, sink: K) -> Result<Self>
    where
        K: AnnouncementSink + 'static,
    {
        opts.validate()?;

        let mut sampler = FrameSampler::new();
        sampler.attach_source(source);
        sampler.attach_surface(FrameBuffer::new(0, 0));

        Ok(Self {
            debounce: DebounceAggregator::new(opts.debounce_interval()),
            opts,
            message,
            sampler,
            display: None,
            sink: Box::new(sink),
            stats: SessionStats::default(),
            source_ended: false,
        })
    }

    /// Render per-frame status onto `surface`.
    ///
    /// Ignored when the options select announcement-only mode.
    pub fn with_status_surface<T>(mut self, surface: T) -> Self
    where
        T: StatusSurface + 'static,
    {
        if self.opts.display_mode.shows_status() {
            self.display = Some(StatusDisplay::new(Box::new(surface), &self.message));
        } else {
            debug!("status surface ignored in announce-only mode");
        }
        self
    }

    pub fn attach_classifier(&mut self, engine: C) {
        self.sampler.attach_classifier(engine);
    }

    /// Run one sampling tick and route its result.
    pub fn sample_tick(&mut self) -> TickOutcome {
        let outcome = self.sampler.tick();
        match outcome {
            TickOutcome::Classified(result) => {
                self.stats.frames_sampled += 1;
                if result.is_motion() {
                    self.stats.motion_frames += 1;
                }
                if let Some(display) = self.display.as_mut() {
                    display.update(result);
                }
                self.debounce.ingest(result);
            }
            TickOutcome::Idle => self.stats.idle_ticks += 1,
            TickOutcome::NoData => self.stats.no_data_ticks += 1,
            TickOutcome::Abandoned => self.stats.abandoned_ticks += 1,
            TickOutcome::SourceEnded => {
                if !self.source_ended {
                    info!("media source ended");
                    self.source_ended = true;
                }
            }
        }
        outcome
    }

    /// Run one dispatch check. Returns `true` if an announcement went out.
    pub fn dispatch_tick(&mut self, now: Instant) -> bool {
        let dispatched = self.debounce.check(now, &self.sink, &self.message);
        if dispatched {
            self.stats.announcements += 1;
        }
        dispatched
    }

    /// The source has ended and no detection is waiting to be announced.
    pub fn is_drained(&self) -> bool {
        self.source_ended && !self.debounce.is_pending()
    }

    /// Drive both timers until `shutdown` resolves (or the source drains, if configured).
    ///
    /// `loader` yields the classification engine. Sampling stays idle until it resolves; a
    /// failed load ends the session with [`Error::ResourceUnavailable`].
    pub async fn run<L, F>(&mut self, loader: L, shutdown: F) -> Result<SessionStats>
    where
        L: Future<Output = Result<C>>,
        F: Future<Output = ()>,
    {
        let mut loader = pin!(loader);
        let mut shutdown = pin!(shutdown);
        let mut loading = !self.sampler.has_classifier();

        let mut sample_timer = interval(self.opts.sample_period());
        sample_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut dispatch_timer = interval(self.opts.dispatch_period());
        dispatch_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            sample_rate_hz = self.opts.sample_rate_hz,
            dispatch_rate_hz = self.opts.dispatch_rate_hz,
            debounce_interval_ms = self.opts.debounce_interval_ms,
            message = self.message.as_str(),
            "session started"
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                loaded = &mut loader, if loading => {
                    loading = false;
                    let engine = loaded.map_err(|err| match err {
                        unavailable @ Error::ResourceUnavailable(_) => unavailable,
                        other => Error::ResourceUnavailable(format!("classifier failed to load: {other}")),
                    })?;
                    info!("classifier loaded");
                    self.sampler.attach_classifier(engine);
                }
                _ = sample_timer.tick() => {
                    self.sample_tick();
                }
                _ = dispatch_timer.tick() => {
                    // A late tick's deadline is earlier than the real dispatch time.
                    self.dispatch_tick(Instant::now());
                    if self.opts.exit_on_source_end && self.is_drained() {
                        info!("source drained");
                        break;
                    }
                }
            }
        }

        info!(stats = ?self.stats, "session finished");
        Ok(self.stats)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn message(&self) -> &AnnouncementMessage {
        &self.message
    }

    pub fn debounce(&self) -> &DebounceAggregator {
        &self.debounce
    }

    pub fn sampler(&self) -> &FrameSampler<C, S> {
        &self.sampler
    }

    pub fn status(&self) -> Option<&StatusDisplay<Box<dyn StatusSurface>>> {
        self.display.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::ClassificationResult;
    use crate::sampler::SamplerState;
    use crate::source::ReadyState;
    use crate::status::StatusTone;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EndlessSource;

    impl FrameSource for EndlessSource {
        fn dimensions(&self) -> Option<(u32, u32)> {
            Some((2, 2))
        }

        fn ready_state(&mut self) -> ReadyState {
            ReadyState::HaveEnoughData
        }

        fn capture(&mut self, _frame: &mut FrameBuffer) -> Result<()> {
            Ok(())
        }
    }

    struct Always(ClassificationResult);

    impl Classifier for Always {
        fn configure(&mut self, _width: u32, _height: u32) -> Result<()> {
            Ok(())
        }

        fn classify(&mut self, _frame: &FrameBuffer) -> Result<ClassificationResult> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl AnnouncementSink for Counter {
        fn announce(&self, _message: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct NullSurface;

    impl StatusSurface for NullSurface {
        fn render(&mut self, _view: &crate::status::StatusView) {}
    }

    fn session(opts: Opts, sink: Arc<Counter>) -> Session<Always, EndlessSource> {
        Session::new(opts, AnnouncementMessage::default(), EndlessSource, sink)
            .expect("valid opts")
            .with_status_surface(NullSurface)
    }

    #[test]
    fn rejects_invalid_opts() {
        let opts = Opts {
            dispatch_rate_hz: 0,
            ..Opts::default()
        };
        let res = Session::<Always, EndlessSource>::new(
            opts,
            AnnouncementMessage::default(),
            EndlessSource,
            Counter::default(),
        );
        assert!(res.is_err());
    }

    #[test]
    fn ticks_are_idle_until_a_classifier_is_attached() {
        let mut session = session(Opts::default(), Arc::default());
        assert_eq!(session.sample_tick(), TickOutcome::Idle);
        assert_eq!(session.stats().idle_ticks, 1);

        session.attach_classifier(Always(ClassificationResult::MotionDetected));
        session.sample_tick();
        assert_eq!(session.sampler().state(), SamplerState::Sampling);
        assert_eq!(
            session.status().map(|s| s.current().tone),
            Some(StatusTone::Alert)
        );
        assert!(session.debounce().is_pending());
    }

    #[test]
    fn announce_only_mode_has_no_status_display() {
        let session = session(Opts::announce_only(), Arc::default());
        assert!(session.status().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_shutdown_and_reports_stats() -> anyhow::Result<()> {
        let sink = Arc::new(Counter::default());
        let mut session = session(Opts::default(), sink.clone());

        let stats = session
            .run(
                async { Ok::<_, Error>(Always(ClassificationResult::MotionDetected)) },
                tokio::time::sleep(Duration::from_millis(1150)),
            )
            .await?;

        // Announced at t=0, then again at the first check past the 1000ms window (t=1100).
        assert_eq!(stats.announcements, 2);
        assert_eq!(sink.0.load(Ordering::SeqCst), 2);
        assert!(stats.frames_sampled >= 30);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn failed_load_surfaces_as_resource_unavailable() {
        let mut session = session(Opts::default(), Arc::default());
        let res = session
            .run(
                async { Err::<Always, _>(Error::msg("model missing")) },
                std::future::pending::<()>(),
            )
            .await;

        let err = res.unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable(_)));
        assert!(err.to_string().contains("model missing"));
    }
}
