//! Data model: monitored stream entries and process-wide settings.

mod settings;
mod stream;
mod tristate;

pub use settings::{GlobalSettings, MAX_CHECK_INTERVAL_SECS, MIN_CHECK_INTERVAL_SECS};
pub use stream::{StreamEntry, normalize_url};
pub use tristate::Tristate;
