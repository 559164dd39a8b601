//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use condor::config::ConfigSource;
use condor::launcher::{self, PlayerProfile};
use condor::model::{GlobalSettings, StreamEntry, normalize_url};
use condor::monitor::{MonitorEvent, StreamMonitor};
use probe::{LivenessProbe, ProbeError, StreamlinkProbe};

use crate::config::{ConfigFile, FileConfig};
use crate::error::{CliError, Result};
use crate::output;

pub struct CommandExecutor {
    store: Arc<FileConfig>,
}

impl CommandExecutor {
    pub fn new(store: FileConfig) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    fn probe(&self, settings: &GlobalSettings) -> StreamlinkProbe {
        StreamlinkProbe::new().with_binary(settings.extractor_binary())
    }

    pub async fn watch(&self, interval_override: Option<u64>) -> Result<()> {
        let settings = self.store.global();
        let seconds = interval_override.unwrap_or(settings.check_interval_secs);

        let probe = self.probe(&settings);
        if !probe.is_available() {
            warn!(
                "{} not found; every stream will read offline",
                settings.extractor_binary()
            );
        }

        let monitor = Arc::new(StreamMonitor::new(
            Arc::clone(&self.store) as Arc<dyn ConfigSource>,
            Arc::new(probe),
        ));
        let mut events = monitor.subscribe();
        monitor.run(Duration::from_secs(seconds))?;

        println!(
            "watching {} configured stream(s) every {seconds}s; press Ctrl-C to stop",
            self.store.entries().len()
        );
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                event = events.recv() => match event {
                    Ok(event) => self.report(event),
                    Err(RecvError::Lagged(missed)) => {
                        warn!("event stream lagged, {missed} event(s) dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        monitor.stop();
        monitor.join().await;
        Ok(())
    }

    fn report(&self, event: MonitorEvent) {
        match &event {
            MonitorEvent::StreamOnline { entry, .. }
            | MonitorEvent::StreamOffline { entry, .. } => {
                info!("{}", event.description());
                if entry.effective_notify(&self.store.global()) {
                    let marker = if matches!(event, MonitorEvent::StreamOnline { .. }) {
                        "LIVE"
                    } else {
                        "ENDED"
                    };
                    println!("[{marker}] {} ({})", entry.display_name(), entry.url);
                }
            }
            MonitorEvent::CheckCycleComplete { checked, .. } => {
                debug!("cycle complete, {checked} stream(s) checked");
            }
        }
    }

    pub async fn check(&self, url: &str, json: bool) -> Result<()> {
        let settings = self.store.global();
        let probe = self.probe(&settings);
        match probe.try_resolve(url).await {
            Ok(status) => {
                output::print_check(url, &status.platform, status.is_live, None, json)?;
            }
            Err(ProbeError::NoStreams) => {
                output::print_check(
                    url,
                    probe::UNKNOWN_PLATFORM,
                    false,
                    Some("no playable streams"),
                    json,
                )?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    pub fn play(&self, stream: &str, alternate: bool) -> Result<()> {
        let settings = self.store.global();
        let entry = self.find_entry(stream)?;
        let launched = launcher::launch(&entry, &settings, profile_for(alternate))?;
        println!("launched {} (pid {})", entry.display_name(), launched.pid);
        Ok(())
    }

    pub fn command(&self, stream: &str, alternate: bool) -> Result<()> {
        let settings = self.store.global();
        let entry = self.find_entry(stream)?;
        let argv = launcher::build_command(&entry, &settings, profile_for(alternate))?;
        println!("{}", launcher::format_command(&argv));
        Ok(())
    }

    pub fn list(&self, json: bool) -> Result<()> {
        let settings = self.store.global();
        let entries = self.store.entries();
        output::print_list(&entries, &settings, json)
    }

    pub fn init(&self) -> Result<()> {
        if self.store.exists() {
            println!(
                "configuration already exists at {}",
                self.store.path().display()
            );
            return Ok(());
        }
        self.store.save(&ConfigFile::starter())?;
        println!(
            "wrote starter configuration to {}",
            self.store.path().display()
        );
        Ok(())
    }

    pub fn config_path(&self) -> Result<()> {
        println!("{}", self.store.path().display());
        Ok(())
    }

    /// Resolve a `play`/`command` target: configured name first, then
    /// configured URL; anything else that looks like a URL becomes an ad-hoc
    /// entry with global defaults.
    fn find_entry(&self, stream: &str) -> Result<StreamEntry> {
        let entries = self.store.entries();
        if let Some(entry) = entries.iter().find(|e| e.display_name() == stream) {
            return Ok(entry.clone());
        }
        let key = normalize_url(stream);
        if let Some(entry) = entries.iter().find(|e| e.status_key() == key) {
            return Ok(entry.clone());
        }
        if stream.contains("://") {
            return Ok(StreamEntry::new(stream));
        }
        Err(CliError::UnknownStream(stream.to_string()))
    }
}

fn profile_for(alternate: bool) -> PlayerProfile {
    if alternate {
        PlayerProfile::Alternate
    } else {
        PlayerProfile::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use condor::model::Tristate;

    fn executor_with(streams: Vec<StreamEntry>) -> (tempfile::TempDir, CommandExecutor) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfig::new(dir.path().join("condor.toml"));
        let config = ConfigFile {
            settings: GlobalSettings::default(),
            streams,
        };
        store.save(&config).unwrap();
        (dir, CommandExecutor::new(store))
    }

    #[test]
    fn test_find_entry_by_name_then_url() {
        let mut entry = StreamEntry::new("https://example.com/live");
        entry.name = "Example".to_string();
        entry.notify = Tristate::On;
        let (_dir, executor) = executor_with(vec![entry]);

        let by_name = executor.find_entry("Example").unwrap();
        assert_eq!(by_name.url, "https://example.com/live");
        assert_eq!(by_name.notify, Tristate::On);

        let by_url = executor.find_entry("https://example.com/live").unwrap();
        assert_eq!(by_url.name, "Example");
    }

    #[test]
    fn test_find_entry_ad_hoc_url() {
        let (_dir, executor) = executor_with(vec![]);
        let entry = executor.find_entry("https://example.com/other").unwrap();
        assert_eq!(entry.url, "https://example.com/other");
        assert!(entry.name.is_empty());
    }

    #[test]
    fn test_find_entry_unknown_name() {
        let (_dir, executor) = executor_with(vec![]);
        let err = executor.find_entry("nope").unwrap_err();
        assert!(matches!(err, CliError::UnknownStream(_)));
    }
}
