//! Process-wide settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest allowed poll interval.
pub const MIN_CHECK_INTERVAL_SECS: u64 = 10;
/// Longest allowed poll interval.
pub const MAX_CHECK_INTERVAL_SECS: u64 = 3600;

static DEFAULT_EXTRACTOR: &str = "streamlink";

fn default_check_interval() -> u64 {
    60
}

fn default_extractor() -> String {
    DEFAULT_EXTRACTOR.to_string()
}

fn default_quality() -> String {
    "best".to_string()
}

/// Global configuration read by every core component.
///
/// The core treats these values as externally owned: they are re-read on
/// every poll tick and launch call and may change between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Whether entries without an explicit `check` toggle are polled.
    pub monitoring_enabled: bool,
    /// Whether entries without an explicit `notify` toggle notify.
    pub default_notify: bool,
    /// Seconds between poll cycles; valid range 10–3600, enforced when the
    /// monitor loop starts.
    #[serde(rename = "check_interval")]
    pub check_interval_secs: u64,
    /// Extractor binary invoked for liveness checks and launches.
    pub extractor: String,
    /// Extractor arguments applied to every stream.
    pub default_extractor_args: String,
    /// Quality preference used when an entry has none.
    pub default_quality: String,
    /// Player executable used when an entry names none.
    pub default_player: String,
    /// Player arguments applied to every stream.
    pub default_player_args: String,
    /// Secondary player profile, selectable at launch time.
    pub alternate_player: String,
    pub alternate_player_args: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            monitoring_enabled: false,
            default_notify: false,
            check_interval_secs: default_check_interval(),
            extractor: default_extractor(),
            default_extractor_args: String::new(),
            default_quality: default_quality(),
            default_player: String::new(),
            default_player_args: String::new(),
            alternate_player: String::new(),
            alternate_player_args: String::new(),
        }
    }
}

impl GlobalSettings {
    /// Poll interval as a [`Duration`]; validity is checked by the monitor.
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Extractor binary, falling back to `streamlink` when configured empty.
    pub fn extractor_binary(&self) -> &str {
        if self.extractor.is_empty() {
            DEFAULT_EXTRACTOR
        } else {
            &self.extractor
        }
    }
}
