//! `glimpse`: frame sampling and debounced accessibility announcements for live motion
//! detection.
//!
//! This crate provides:
//! - A fixed-rate frame sampler feeding a pluggable motion-classification engine
//! - A debounce aggregator turning bursts of detections into rate-limited announcements
//! - One-shot live-region announcements with a self-cleaning lifecycle
//! - A per-frame visual status indicator with no debounce
//!
//! Most consumers should start with [`Session`], which owns all per-feed state and drives the
//! sampling and dispatch timers on one task.

// High-level API (most consumers should start here).
pub mod opts;
pub mod session;

// Pipeline stages.
pub mod classification;
pub mod classifier;
pub mod debounce;
pub mod frame;
pub mod sampler;
pub mod source;

// User-facing outputs.
pub mod announce;
pub mod display_mode;
pub mod message;
pub mod status;

// Built-in engines, sources, and output surfaces.
pub mod classifiers;
pub mod hosts;
pub mod sources;

mod error;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use announce::{AnnounceTiming, AnnouncementSink, LiveRegionAnnouncer, LiveRegionHost, Politeness};
pub use classification::ClassificationResult;
pub use classifier::{Classifier, ClassifierAdapter};
pub use classifiers::frame_diff::{FrameDiffClassifier, FrameDiffConfig};
pub use debounce::{DebounceAggregator, DebounceState};
pub use display_mode::DisplayMode;
pub use error::{Error, Result};
pub use frame::FrameBuffer;
pub use message::AnnouncementMessage;
pub use opts::Opts;
pub use sampler::{FrameSampler, SamplerState, TickOutcome};
pub use session::{Session, SessionStats};
pub use source::{FrameSource, ReadyState};
pub use sources::raw::RawFrameSource;
pub use status::{StatusDisplay, StatusSurface, StatusView};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
