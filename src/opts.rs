use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::announce::{AnnounceTiming, Politeness};
use crate::classifiers::frame_diff::FrameDiffConfig;
use crate::display_mode::DisplayMode;
use crate::{Error, Result};

/// Upper bound for both timer rates.
pub const MAX_RATE_HZ: u32 = 1000;

/// Options that control how a session samples, debounces, and announces.
///
/// `glimpse-cli` fills this in from its flags and an optional JSON file; embedders build it
/// directly. Every field has a default, so a config file only lists the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Opts {
    /// Frame sampling rate.
    pub sample_rate_hz: u32,

    /// Rate of the announcement dispatch check, independent of sampling.
    pub dispatch_rate_hz: u32,

    /// Announcements are always more than this far apart.
    pub debounce_interval_ms: u64,

    pub display_mode: DisplayMode,

    pub politeness: Politeness,

    /// Delay before a live region receives its text.
    pub populate_delay_ms: u64,

    /// Delay, from creation, before a live region is removed.
    pub remove_delay_ms: u64,

    /// Stop the session once the source ends and nothing is left to announce.
    pub exit_on_source_end: bool,

    /// Settings for the built-in frame-difference engine.
    pub frame_diff: FrameDiffConfig,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            sample_rate_hz: 30,
            dispatch_rate_hz: 10,
            debounce_interval_ms: 1000,
            display_mode: DisplayMode::Full,
            politeness: Politeness::Polite,
            populate_delay_ms: 100,
            remove_delay_ms: 1000,
            exit_on_source_end: true,
            frame_diff: FrameDiffConfig::default(),
        }
    }
}

impl Opts {
    /// Announcement-only preset: no status indicator and a longer debounce window.
    pub fn announce_only() -> Self {
        Self {
            display_mode: DisplayMode::AnnounceOnly,
            debounce_interval_ms: 2000,
            ..Self::default()
        }
    }

    /// Load options from a JSON file, filling missing keys with defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| {
            Error::config(format!("failed to read config '{}': {err}", path.display()))
        })?;
        let opts: Self = serde_json::from_slice(&bytes)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        check_rate("sample_rate_hz", self.sample_rate_hz)?;
        check_rate("dispatch_rate_hz", self.dispatch_rate_hz)?;
        if self.remove_delay_ms <= self.populate_delay_ms {
            return Err(Error::config(format!(
                "remove_delay_ms ({}) must exceed populate_delay_ms ({})",
                self.remove_delay_ms, self.populate_delay_ms
            )));
        }
        Ok(())
    }

    pub fn sample_period(&self) -> Duration {
        period(self.sample_rate_hz)
    }

    pub fn dispatch_period(&self) -> Duration {
        period(self.dispatch_rate_hz)
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_interval_ms)
    }

    pub fn announce_timing(&self) -> AnnounceTiming {
        AnnounceTiming {
            populate_delay: Duration::from_millis(self.populate_delay_ms),
            remove_delay: Duration::from_millis(self.remove_delay_ms),
        }
    }
}

fn check_rate(name: &str, rate_hz: u32) -> Result<()> {
    if rate_hz == 0 || rate_hz > MAX_RATE_HZ {
        return Err(Error::config(format!(
            "{name} must be between 1 and {MAX_RATE_HZ}, got {rate_hz}"
        )));
    }
    Ok(())
}

fn period(rate_hz: u32) -> Duration {
    Duration::from_secs(1) / rate_hz.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_full_pipeline() {
        let opts = Opts::default();
        assert_eq!(opts.sample_period(), Duration::from_nanos(33_333_333));
        assert_eq!(opts.dispatch_period(), Duration::from_millis(100));
        assert_eq!(opts.debounce_interval(), Duration::from_millis(1000));
        assert!(opts.display_mode.shows_status());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn announce_only_disables_status_and_widens_window() {
        let opts = Opts::announce_only();
        assert!(!opts.display_mode.shows_status());
        assert_eq!(opts.debounce_interval_ms, 2000);
    }

    #[test]
    fn partial_json_keeps_defaults() -> anyhow::Result<()> {
        let opts: Opts = serde_json::from_str(
            r#"{"debounce_interval_ms": 1500, "display_mode": "announce-only", "frame_diff": {"threshold": 12}}"#,
        )?;
        assert_eq!(opts.debounce_interval_ms, 1500);
        assert_eq!(opts.display_mode, DisplayMode::AnnounceOnly);
        assert_eq!(opts.frame_diff.threshold, 12);
        assert_eq!(opts.frame_diff.motion_pixel_count, 100);
        assert_eq!(opts.sample_rate_hz, 30);
        Ok(())
    }

    #[test]
    fn validate_rejects_zero_rates_and_inverted_delays() {
        let opts = Opts {
            sample_rate_hz: 0,
            ..Opts::default()
        };
        assert!(opts.validate().is_err());

        let opts = Opts {
            populate_delay_ms: 1000,
            remove_delay_ms: 1000,
            ..Opts::default()
        };
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("must exceed"));
    }

    #[test]
    fn validate_rejects_rates_too_fast_for_a_timer() {
        for rate in [MAX_RATE_HZ + 1, 2_000_000_000] {
            let opts = Opts {
                sample_rate_hz: rate,
                ..Opts::default()
            };
            let err = opts.validate().unwrap_err();
            assert!(err.to_string().contains("sample_rate_hz"));

            let opts = Opts {
                dispatch_rate_hz: rate,
                ..Opts::default()
            };
            assert!(opts.validate().is_err());
        }

        let opts = Opts {
            sample_rate_hz: MAX_RATE_HZ,
            dispatch_rate_hz: MAX_RATE_HZ,
            ..Opts::default()
        };
        assert!(opts.validate().is_ok());
        assert_eq!(opts.sample_period(), Duration::from_millis(1));
    }
}
