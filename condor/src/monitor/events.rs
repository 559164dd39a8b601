//! Monitor events for the UI / notification layer.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::model::StreamEntry;

/// Events emitted by the monitor loop.
///
/// Transition events fire once per edge, not once per poll: a stream that
/// stays online across ten polls produces one `StreamOnline`. Events for the
/// same entry are ordered across ticks; events for different entries within
/// one tick have no defined relative order.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A stream transitioned offline → online.
    StreamOnline {
        entry: StreamEntry,
        timestamp: DateTime<Utc>,
    },
    /// A stream transitioned online → offline.
    StreamOffline {
        entry: StreamEntry,
        timestamp: DateTime<Utc>,
    },
    /// Every due entry of one poll tick has been evaluated.
    CheckCycleComplete {
        /// Number of entries checked this tick.
        checked: usize,
        timestamp: DateTime<Utc>,
    },
}

impl MonitorEvent {
    pub(crate) fn online(entry: StreamEntry) -> Self {
        Self::StreamOnline {
            entry,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn offline(entry: StreamEntry) -> Self {
        Self::StreamOffline {
            entry,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn cycle_complete(checked: usize) -> Self {
        Self::CheckCycleComplete {
            checked,
            timestamp: Utc::now(),
        }
    }

    /// Human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            MonitorEvent::StreamOnline { entry, .. } => {
                format!("{} is now live", entry.display_name())
            }
            MonitorEvent::StreamOffline { entry, .. } => {
                format!("{} went offline", entry.display_name())
            }
            MonitorEvent::CheckCycleComplete { checked, .. } => {
                format!("check cycle complete ({checked} checked)")
            }
        }
    }

    /// Whether this is a per-stream transition (as opposed to cycle bookkeeping).
    pub fn is_transition(&self) -> bool {
        !matches!(self, MonitorEvent::CheckCycleComplete { .. })
    }
}

/// Broadcaster for monitor events.
///
/// Thin wrapper over a `tokio::sync::broadcast` channel; every subscriber
/// sees every event, and publishing never blocks the loop.
#[derive(Clone)]
pub struct MonitorEventBroadcaster {
    sender: broadcast::Sender<MonitorEvent>,
}

impl MonitorEventBroadcaster {
    /// Create a new broadcaster with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; a send error only means nobody is listening.
    pub fn publish(
        &self,
        event: MonitorEvent,
    ) -> Result<usize, broadcast::error::SendError<MonitorEvent>> {
        self.sender.send(event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MonitorEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
