//! TOML-backed configuration store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use condor::config::ConfigSource;
use condor::model::{GlobalSettings, StreamEntry, Tristate};

use crate::error::{CliError, Result};

/// On-disk configuration document: a `[settings]` table plus `[[stream]]`
/// blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub settings: GlobalSettings,
    #[serde(rename = "stream")]
    pub streams: Vec<StreamEntry>,
}

impl ConfigFile {
    /// Starter document written by `condor init`.
    pub fn starter() -> Self {
        let settings = GlobalSettings {
            monitoring_enabled: true,
            ..GlobalSettings::default()
        };
        let mut example = StreamEntry::new("https://www.twitch.tv/example");
        example.name = "Example".to_string();
        example.check = Tristate::Off;
        Self {
            settings,
            streams: vec![example],
        }
    }
}

/// File-backed [`ConfigSource`].
///
/// The file is read on every access, so edits made while `condor watch` is
/// running are picked up on the monitor's next tick. An unreadable file
/// degrades to defaults with a warning instead of killing the loop.
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default per-user location, e.g. `~/.config/condor/condor.toml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("condor").join("condor.toml"))
            .ok_or_else(|| CliError::Config("no user configuration directory".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(config)?)?;
        Ok(())
    }

    fn load_or_default(&self) -> ConfigFile {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "unreadable configuration at {}: {e}",
                    self.path.display()
                );
                ConfigFile::default()
            }
        }
    }
}

impl ConfigSource for FileConfig {
    fn global(&self) -> GlobalSettings {
        self.load_or_default().settings
    }

    fn entries(&self) -> Vec<StreamEntry> {
        self.load_or_default().streams
    }
}
