//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type aggregating the component errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Argument error: {0}")]
    Merge(#[from] argmerge::MergeError),

    #[error("Launch error: {0}")]
    Launch(#[from] crate::launcher::LaunchError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] crate::monitor::MonitorError),

    #[error("Probe error: {0}")]
    Probe(#[from] probe::ProbeError),
}
