//! One-shot accessible announcements.
//!
//! Every announcement gets its own transient live region:
//! 1. the region is created empty and marked live,
//! 2. after `populate_delay` the message text is written into it,
//! 3. after `remove_delay` (measured from creation) the region is removed.
//!
//! Assistive technology only reads changes to a live region it already knows about, so text
//! written in the same instant the region appears can be missed. The populate delay gives the
//! host time to register the region; it reduces that risk but cannot remove it, since hosts
//! expose no "region observed" signal.
//!
//! Lifecycles run as detached tasks. Overlapping announcements each keep their own region.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Delay before a new region receives its text.
pub const DEFAULT_POPULATE_DELAY: Duration = Duration::from_millis(100);

/// Delay, from creation, before a region is removed.
pub const DEFAULT_REMOVE_DELAY: Duration = Duration::from_millis(1000);

/// Anything that can deliver an announcement to the user.
pub trait AnnouncementSink {
    /// Deliver `message`. Fire-and-forget: there is no result and no error path.
    fn announce(&self, message: &str);
}

impl<K: AnnouncementSink + ?Sized> AnnouncementSink for Arc<K> {
    fn announce(&self, message: &str) {
        (**self).announce(message)
    }
}

impl<K: AnnouncementSink + ?Sized> AnnouncementSink for Box<K> {
    fn announce(&self, message: &str) {
        (**self).announce(message)
    }
}

/// How urgently assistive technology should interrupt to read a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Politeness {
    /// Read when the user is idle.
    #[default]
    Polite,
    /// Interrupt whatever is being read.
    Assertive,
}

impl Politeness {
    pub fn as_str(self) -> &'static str {
        match self {
            Politeness::Polite => "polite",
            Politeness::Assertive => "assertive",
        }
    }
}

/// Fixed lifecycle delays for a transient region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceTiming {
    pub populate_delay: Duration,
    pub remove_delay: Duration,
}

impl Default for AnnounceTiming {
    fn default() -> Self {
        Self {
            populate_delay: DEFAULT_POPULATE_DELAY,
            remove_delay: DEFAULT_REMOVE_DELAY,
        }
    }
}

/// The accessibility output surface hosting transient live regions.
///
/// Calls for one region always arrive in order `create_region`, `populate_region`,
/// `remove_region`. Calls for different regions may interleave.
pub trait LiveRegionHost: Send + Sync {
    fn create_region(&self, id: &str, politeness: Politeness);
    fn populate_region(&self, id: &str, text: &str);
    fn remove_region(&self, id: &str);
}

/// An [`AnnouncementSink`] that speaks through transient live regions on a [`LiveRegionHost`].
///
/// Must be used from within a tokio runtime; the populate and remove steps are scheduled on it.
#[derive(Clone)]
pub struct LiveRegionAnnouncer {
    host: Arc<dyn LiveRegionHost>,
    politeness: Politeness,
    timing: AnnounceTiming,
}

impl LiveRegionAnnouncer {
    pub fn new(host: Arc<dyn LiveRegionHost>) -> Self {
        Self {
            host,
            politeness: Politeness::default(),
            timing: AnnounceTiming::default(),
        }
    }

    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.politeness = politeness;
        self
    }

    pub fn with_timing(mut self, timing: AnnounceTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn politeness(&self) -> Politeness {
        self.politeness
    }

    pub fn timing(&self) -> AnnounceTiming {
        self.timing
    }
}

impl AnnouncementSink for LiveRegionAnnouncer {
    fn announce(&self, message: &str) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("announcement dropped: no async runtime to schedule the live region");
            return;
        };

        let id = format!("speak-{}", Uuid::new_v4());
        self.host.create_region(&id, self.politeness);
        debug!(%id, politeness = self.politeness.as_str(), "live region created");

        let host = Arc::clone(&self.host);
        let text = message.to_owned();
        let AnnounceTiming {
            populate_delay,
            remove_delay,
        } = self.timing;

        runtime.spawn(async move {
            tokio::time::sleep(populate_delay).await;
            host.populate_region(&id, &text);

            tokio::time::sleep(remove_delay.saturating_sub(populate_delay)).await;
            host.remove_region(&id);
            debug!(%id, "live region removed");
        });
    }
}
