//! Probe error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a liveness check.
///
/// All of these normalize to "offline" on the polling path; they carry
/// detail for interactive callers only.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The extractor binary could not be started.
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The check did not finish within the configured bound.
    #[error("liveness check timed out after {0:?}")]
    Timeout(Duration),

    /// No extractor plugin handles this URL.
    #[error("unsupported url: {0}")]
    UnsupportedUrl(String),

    /// The platform answered, but exposes no playable stream.
    #[error("no playable streams found")]
    NoStreams,

    /// The extractor produced output that is not the expected JSON document.
    #[error("unreadable extractor output: {0}")]
    Json(#[from] serde_json::Error),

    /// The extractor reported an error of its own.
    #[error("extractor error: {0}")]
    Tool(String),
}
