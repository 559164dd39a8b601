//! The polling loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::{StreamExt, stream};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use probe::LivenessProbe;

use crate::config::ConfigSource;
use crate::model::{
    MAX_CHECK_INTERVAL_SECS, MIN_CHECK_INTERVAL_SECS, StreamEntry, normalize_url,
};

use super::events::{MonitorEvent, MonitorEventBroadcaster};

/// Upper bound on concurrent liveness checks within one tick.
const MAX_CONCURRENT_CHECKS: usize = 8;

/// Slack added on top of the probe's own timeout, so even a probe that
/// ignores its bound cannot stall a cycle.
const POLL_TIMEOUT_GRACE: Duration = Duration::from_secs(15);

/// Errors from monitor lifecycle operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Rejected at `run()` time; the loop never starts with a bad interval.
    #[error(
        "check interval {seconds}s outside valid range \
         {MIN_CHECK_INTERVAL_SECS}-{MAX_CHECK_INTERVAL_SECS}s"
    )]
    InvalidInterval { seconds: u64 },

    /// `run()` was called on a monitor whose loop already started.
    #[error("monitor loop already started")]
    AlreadyStarted,
}

/// Background stream monitor.
///
/// Owns the per-stream online/offline map for the lifetime of one loop run.
/// Configuration is re-read from the [`ConfigSource`] on every tick, so
/// entry and settings changes take effect on the next tick. The map is only
/// ever written by the loop's own tick execution.
pub struct StreamMonitor {
    config: Arc<dyn ConfigSource>,
    probe: Arc<dyn LivenessProbe>,
    events: MonitorEventBroadcaster,
    status: DashMap<String, bool>,
    cancel: CancellationToken,
    started: AtomicBool,
    paused: AtomicBool,
    poll_timeout: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamMonitor {
    pub fn new(config: Arc<dyn ConfigSource>, probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            config,
            probe,
            events: MonitorEventBroadcaster::new(),
            status: DashMap::new(),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            poll_timeout: Duration::from_secs(30) + POLL_TIMEOUT_GRACE,
            task: Mutex::new(None),
        }
    }

    /// Override the per-entry poll bound (probe timeout plus grace).
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Subscribe to transition and cycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub fn event_broadcaster(&self) -> &MonitorEventBroadcaster {
        &self.events
    }

    /// Start the background loop.
    ///
    /// Fails fast on an interval outside 10–3600 s (values are rejected, not
    /// clamped) and on a second `run()` call. The status map starts empty:
    /// every entry begins offline and the first tick fires immediately.
    pub fn run(self: &Arc<Self>, interval: Duration) -> Result<(), MonitorError> {
        let seconds = interval.as_secs();
        if !(MIN_CHECK_INTERVAL_SECS..=MAX_CHECK_INTERVAL_SECS).contains(&seconds) {
            return Err(MonitorError::InvalidInterval { seconds });
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyStarted);
        }

        let monitor = Arc::clone(self);
        let task = tokio::spawn(monitor.run_loop(interval));
        *self.task.lock() = Some(task);
        Ok(())
    }

    /// Request the loop to stop. Idempotent and safe to call concurrently
    /// with an in-progress tick; no poll starts after this returns, and an
    /// in-flight cycle is abandoned at its next await point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait for the loop task to finish after [`StreamMonitor::stop`].
    pub async fn join(&self) {
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Suspend polling without tearing the loop down.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    /// Resume polling after [`StreamMonitor::pause`].
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Whether the given URL was online at its last poll.
    pub fn is_online(&self, url: &str) -> bool {
        self.status
            .get(&normalize_url(url))
            .map(|slot| *slot)
            .unwrap_or(false)
    }

    /// Entries currently online, sorted by (platform, name) for stable
    /// presentation.
    pub fn online_streams(&self) -> Vec<StreamEntry> {
        let mut online: Vec<StreamEntry> = self
            .config
            .entries()
            .into_iter()
            .filter(|entry| self.is_online(&entry.url))
            .collect();
        online.sort_by(|a, b| {
            (a.kind_or_unknown(), a.display_name()).cmp(&(b.kind_or_unknown(), b.display_name()))
        });
        online
    }

    async fn run_loop(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("stream monitor started, polling every {}s", interval.as_secs());

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if self.paused.load(Ordering::Relaxed) {
                continue;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = self.run_cycle() => {}
            }
        }

        // Status is loop-lifetime state, discarded once the loop ends.
        self.status.clear();
        info!("stream monitor stopped");
    }

    async fn run_cycle(&self) {
        let global = self.config.global();
        let due: Vec<StreamEntry> = self
            .config
            .entries()
            .into_iter()
            .filter(|entry| !entry.url.trim().is_empty() && entry.effective_check(&global))
            .collect();

        if !due.is_empty() {
            debug!("checking {} stream(s)", due.len());
        }

        let bound = self.poll_timeout;
        let checks = due.into_iter().map(|entry| {
            let probe = Arc::clone(&self.probe);
            let cancel = self.cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    return None;
                }
                let is_live = match tokio::time::timeout(bound, probe.resolve(&entry.url)).await {
                    Ok(status) => status.is_live,
                    Err(_) => {
                        warn!(
                            "liveness check for {} exceeded {}s, treating as offline",
                            entry.url,
                            bound.as_secs()
                        );
                        false
                    }
                };
                Some((entry, is_live))
            }
        });
        let results: Vec<_> = stream::iter(checks)
            .buffer_unordered(MAX_CONCURRENT_CHECKS)
            .collect()
            .await;

        let mut checked = 0;
        for (entry, is_live) in results.into_iter().flatten() {
            checked += 1;
            self.apply_status(entry, is_live);
        }
        let _ = self.events.publish(MonitorEvent::cycle_complete(checked));
    }

    /// Record one poll result and emit a transition event on an edge.
    ///
    /// Called only from the cycle task, which keeps the status map
    /// single-writer.
    fn apply_status(&self, entry: StreamEntry, is_live: bool) {
        let key = entry.status_key();
        let was_live = self.status.get(&key).map(|slot| *slot).unwrap_or(false);
        if is_live != was_live {
            if is_live {
                info!("stream online: {}", entry.display_name());
                let _ = self.events.publish(MonitorEvent::online(entry));
            } else {
                info!("stream offline: {}", entry.display_name());
                let _ = self.events.publish(MonitorEvent::offline(entry));
            }
        }
        self.status.insert(key, is_live);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;

    use probe::{ProbeError, ResolvedStatus};

    use crate::config::StaticConfig;
    use crate::model::{GlobalSettings, Tristate};

    /// Probe that replays a scripted liveness sequence per URL, repeating
    /// the last value once the script runs down to it. Unknown URLs fail.
    struct ScriptedProbe {
        script: Mutex<HashMap<String, VecDeque<bool>>>,
        calls: AtomicUsize,
        urls_seen: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn new(scripts: &[(&str, &[bool])]) -> Self {
            let script = scripts
                .iter()
                .map(|(url, values)| (url.to_string(), values.iter().copied().collect()))
                .collect();
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
                urls_seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LivenessProbe for ScriptedProbe {
        async fn try_resolve(&self, url: &str) -> Result<ResolvedStatus, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls_seen.lock().push(url.to_string());
            let mut script = self.script.lock();
            match script.get_mut(url) {
                Some(values) => {
                    let is_live = if values.len() > 1 {
                        values.pop_front().unwrap_or(false)
                    } else {
                        values.front().copied().unwrap_or(false)
                    };
                    Ok(ResolvedStatus::new("test", is_live))
                }
                None => Err(ProbeError::NoStreams),
            }
        }
    }

    /// Probe that always fails.
    struct AlwaysFailingProbe;

    #[async_trait]
    impl LivenessProbe for AlwaysFailingProbe {
        async fn try_resolve(&self, _url: &str) -> Result<ResolvedStatus, ProbeError> {
            Err(ProbeError::Tool("backend exploded".into()))
        }
    }

    /// Probe that reports live exactly once, then fails on every later call.
    struct OnlineOnceProbe {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LivenessProbe for OnlineOnceProbe {
        async fn try_resolve(&self, _url: &str) -> Result<ResolvedStatus, ProbeError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(ResolvedStatus::new("test", true))
            } else {
                Err(ProbeError::Tool("backend exploded".into()))
            }
        }
    }

    fn monitoring_on() -> GlobalSettings {
        GlobalSettings {
            monitoring_enabled: true,
            ..GlobalSettings::default()
        }
    }

    fn monitor_with(
        config: Arc<StaticConfig>,
        probe: Arc<dyn LivenessProbe>,
    ) -> Arc<StreamMonitor> {
        Arc::new(StreamMonitor::new(config, probe))
    }

    /// Receive events until `cycles` cycle-complete markers passed, returning
    /// the transition events seen on the way.
    async fn transitions_after_cycles(
        rx: &mut broadcast::Receiver<MonitorEvent>,
        cycles: usize,
    ) -> Vec<MonitorEvent> {
        let mut transitions = Vec::new();
        let mut seen = 0;
        while seen < cycles {
            match rx.recv().await.expect("event stream ended early") {
                MonitorEvent::CheckCycleComplete { .. } => seen += 1,
                event => transitions.push(event),
            }
        }
        transitions
    }

    #[tokio::test(start_paused = true)]
    async fn test_transitions_emitted_once_per_edge() {
        let config = Arc::new(StaticConfig::new(
            monitoring_on(),
            vec![StreamEntry::new("https://x/y")],
        ));
        let probe = Arc::new(ScriptedProbe::new(&[(
            "https://x/y",
            &[true, true, false, false, true],
        )]));
        let monitor = monitor_with(config, probe);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let transitions = transitions_after_cycles(&mut rx, 5).await;
        monitor.stop();
        monitor.join().await;

        // [T, T, F, F, T] is exactly three edges: online, offline, online.
        assert_eq!(transitions.len(), 3);
        assert!(matches!(transitions[0], MonitorEvent::StreamOnline { .. }));
        assert!(matches!(transitions[1], MonitorEvent::StreamOffline { .. }));
        assert!(matches!(transitions[2], MonitorEvent::StreamOnline { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_reads_as_offline() {
        let config = Arc::new(StaticConfig::new(
            monitoring_on(),
            vec![StreamEntry::new("https://x/y")],
        ));
        let monitor = monitor_with(config, Arc::new(AlwaysFailingProbe));
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let transitions = transitions_after_cycles(&mut rx, 3).await;
        monitor.stop();
        monitor.join().await;

        // Never online, so no edges at all; the loop survived every failure.
        assert!(transitions.is_empty());
        assert!(!monitor.is_online("https://x/y"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_online_is_one_offline_edge() {
        // One successful online poll, then the probe starts failing: exactly
        // one online edge and one offline edge, and the failures never kill
        // the loop.
        let config = Arc::new(StaticConfig::new(
            monitoring_on(),
            vec![StreamEntry::new("https://x/y")],
        ));
        let probe = Arc::new(OnlineOnceProbe {
            calls: AtomicUsize::new(0),
        });
        let monitor = monitor_with(config, probe);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let transitions = transitions_after_cycles(&mut rx, 4).await;
        monitor.stop();
        monitor.join().await;

        assert_eq!(transitions.len(), 2);
        assert!(matches!(transitions[0], MonitorEvent::StreamOnline { .. }));
        assert!(matches!(transitions[1], MonitorEvent::StreamOffline { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tristate_check_filters_entries() {
        let mut checked_on = StreamEntry::new("https://a/on");
        checked_on.check = Tristate::On;
        let mut checked_off = StreamEntry::new("https://b/off");
        checked_off.check = Tristate::Off;
        let inherit = StreamEntry::new("https://c/inherit");

        // Global monitoring disabled: only the explicit On entry is polled.
        let global = GlobalSettings::default();
        assert!(!global.monitoring_enabled);
        let config = Arc::new(StaticConfig::new(
            global,
            vec![checked_on, checked_off, inherit],
        ));
        let probe = Arc::new(ScriptedProbe::new(&[("https://a/on", &[true])]));
        let monitor = monitor_with(config, Arc::clone(&probe) as Arc<dyn LivenessProbe>);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let _ = transitions_after_cycles(&mut rx, 1).await;
        monitor.stop();
        monitor.join().await;

        // The loop may have run any number of cycles by now; what matters is
        // that only the explicit On entry was ever polled.
        let urls = probe.urls_seen.lock().clone();
        assert!(!urls.is_empty());
        assert!(urls.iter().all(|url| url == "https://a/on"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_final() {
        let config = Arc::new(StaticConfig::new(
            monitoring_on(),
            vec![StreamEntry::new("https://x/y")],
        ));
        let probe = Arc::new(ScriptedProbe::new(&[("https://x/y", &[true])]));
        let monitor = monitor_with(Arc::clone(&config), Arc::clone(&probe) as _);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let _ = transitions_after_cycles(&mut rx, 2).await;
        monitor.stop();
        monitor.stop();
        monitor.join().await;

        // No poll starts after stop: the call count stays frozen.
        let calls = probe.calls();
        tokio::time::advance(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        assert_eq!(probe.calls(), calls);

        // Status is discarded with the loop.
        assert!(!monitor.is_online("https://x/y"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_suspends_polling() {
        let config = Arc::new(StaticConfig::new(
            monitoring_on(),
            vec![StreamEntry::new("https://x/y")],
        ));
        let probe = Arc::new(ScriptedProbe::new(&[("https://x/y", &[true])]));
        let monitor = monitor_with(config, Arc::clone(&probe) as _);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let _ = transitions_after_cycles(&mut rx, 1).await;

        monitor.pause();
        assert!(monitor.is_paused());
        // Let a cycle that was already in flight drain before snapshotting.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let calls = probe.calls();
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(probe.calls(), calls);

        monitor.resume();
        let _ = transitions_after_cycles(&mut rx, 1).await;
        assert!(probe.calls() > calls);

        monitor.stop();
        monitor.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_added_between_ticks_is_picked_up() {
        let config = Arc::new(StaticConfig::new(
            monitoring_on(),
            vec![StreamEntry::new("https://x/y")],
        ));
        let probe = Arc::new(ScriptedProbe::new(&[
            ("https://x/y", &[false]),
            ("https://x/z", &[true]),
        ]));
        let monitor = monitor_with(Arc::clone(&config), Arc::clone(&probe) as _);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let _ = transitions_after_cycles(&mut rx, 1).await;

        config.set_entries(vec![
            StreamEntry::new("https://x/y"),
            StreamEntry::new("https://x/z"),
        ]);

        // The new entry is picked up on the next tick that reads the config;
        // older cycle events may still be queued, so scan with a bound.
        let mut cycles = 0;
        let found = loop {
            match rx.recv().await.expect("event stream ended early") {
                MonitorEvent::StreamOnline { entry, .. } if entry.url == "https://x/z" => {
                    break true;
                }
                MonitorEvent::CheckCycleComplete { .. } => {
                    cycles += 1;
                    if cycles > 50 {
                        break false;
                    }
                }
                _ => {}
            }
        };
        monitor.stop();
        monitor.join().await;
        assert!(found, "added entry was never polled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_online_streams_sorted_by_kind_then_name() {
        let mut a = StreamEntry::new("https://a");
        a.name = "zeta".to_string();
        a.kind = "twitch".to_string();
        let mut b = StreamEntry::new("https://b");
        b.name = "alpha".to_string();
        b.kind = "youtube".to_string();
        let mut c = StreamEntry::new("https://c");
        c.name = "beta".to_string();
        c.kind = "twitch".to_string();

        let config = Arc::new(StaticConfig::new(monitoring_on(), vec![a, b, c]));
        let probe = Arc::new(ScriptedProbe::new(&[
            ("https://a", &[true]),
            ("https://b", &[true]),
            ("https://c", &[true]),
        ]));
        let monitor = monitor_with(config, probe);
        let mut rx = monitor.subscribe();

        monitor.run(Duration::from_secs(10)).unwrap();
        let _ = transitions_after_cycles(&mut rx, 1).await;

        let names: Vec<String> = monitor
            .online_streams()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        assert_eq!(names, vec!["beta", "zeta", "alpha"]);

        monitor.stop();
        monitor.join().await;
    }

    #[tokio::test]
    async fn test_run_rejects_out_of_range_interval() {
        let config = Arc::new(StaticConfig::default());
        let probe = Arc::new(AlwaysFailingProbe);
        let monitor = monitor_with(config, probe);

        let err = monitor.run(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidInterval { seconds: 5 }));

        let err = monitor.run(Duration::from_secs(4000)).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::InvalidInterval { seconds: 4000 }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_twice_is_rejected() {
        let config = Arc::new(StaticConfig::default());
        let probe = Arc::new(AlwaysFailingProbe);
        let monitor = monitor_with(config, probe);

        monitor.run(Duration::from_secs(10)).unwrap();
        let err = monitor.run(Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, MonitorError::AlreadyStarted));

        monitor.stop();
        monitor.join().await;
    }
}
