//! Liveness resolution for stream URLs.
//!
//! A [`LivenessProbe`] answers one question about a URL: which platform is
//! behind it, and does it currently expose at least one playable stream. The
//! shipped implementation, [`StreamlinkProbe`], shells out to the streamlink
//! CLI in `--json` mode.
//!
//! Callers that poll (the monitor loop) use [`LivenessProbe::resolve`], which
//! never fails: every error class is normalized to "offline". The raw
//! fallible variant, [`LivenessProbe::try_resolve`], is for interactive
//! callers that want the underlying reason.

mod error;
mod streamlink;

use async_trait::async_trait;
use tracing::debug;

pub use error::ProbeError;
pub use streamlink::StreamlinkProbe;

/// Platform identifier reported when detection did not succeed.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Outcome of a liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStatus {
    /// Detected platform identifier (extractor plugin name).
    pub platform: String,
    /// Whether at least one playable stream is currently exposed.
    pub is_live: bool,
}

impl ResolvedStatus {
    pub fn new(platform: impl Into<String>, is_live: bool) -> Self {
        Self {
            platform: platform.into(),
            is_live,
        }
    }

    /// The normalized "could not confirm liveness" answer.
    pub fn offline() -> Self {
        Self::new(UNKNOWN_PLATFORM, false)
    }
}

/// Query interface for stream liveness.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Check a URL, surfacing the failure reason.
    ///
    /// The input is any string; it is not pre-validated as a URL. No retry
    /// happens inside the probe — retry cadence belongs to the polling
    /// caller.
    async fn try_resolve(&self, url: &str) -> Result<ResolvedStatus, ProbeError>;

    /// Check a URL, normalizing every failure to offline.
    ///
    /// This is the polling contract: a network hiccup, an unsupported URL,
    /// a crashed extractor and a timeout all read as "not live", logged at
    /// debug level, and never abort the caller's poll cycle.
    async fn resolve(&self, url: &str) -> ResolvedStatus {
        match self.try_resolve(url).await {
            Ok(status) => status,
            Err(e) => {
                debug!("liveness check failed for {url}: {e}");
                ResolvedStatus::offline()
            }
        }
    }
}
