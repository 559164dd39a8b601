//! CLI error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] condor::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown stream: {0}")]
    UnknownStream(String),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Component errors route through the core aggregate so `?` works on both.

impl From<condor::monitor::MonitorError> for CliError {
    fn from(e: condor::monitor::MonitorError) -> Self {
        Self::Core(e.into())
    }
}

impl From<condor::launcher::LaunchError> for CliError {
    fn from(e: condor::launcher::LaunchError) -> Self {
        Self::Core(e.into())
    }
}

impl From<probe::ProbeError> for CliError {
    fn from(e: probe::ProbeError) -> Self {
        Self::Core(e.into())
    }
}
