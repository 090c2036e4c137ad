use serde::{Deserialize, Serialize};

/// Which user-facing outputs a session drives.
///
/// Announcements are always produced; the visual status indicator is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DisplayMode {
    /// Announcements plus a per-frame status indicator.
    #[default]
    Full,

    /// Announcements only.
    AnnounceOnly,
}

impl DisplayMode {
    pub fn shows_status(self) -> bool {
        matches!(self, DisplayMode::Full)
    }
}
