//! Configuration read interface.
//!
//! The core never owns configuration. It reads a fresh snapshot through
//! [`ConfigSource`] on every poll tick and launch call — no caching across
//! calls — so externally edited entries and settings take effect on the next
//! tick without coordination.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{GlobalSettings, StreamEntry};

/// Read-only view of the externally owned configuration.
pub trait ConfigSource: Send + Sync {
    /// Current global settings.
    fn global(&self) -> GlobalSettings;

    /// Current entries, in their configured order.
    fn entries(&self) -> Vec<StreamEntry>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    fn global(&self) -> GlobalSettings {
        (**self).global()
    }

    fn entries(&self) -> Vec<StreamEntry> {
        (**self).entries()
    }
}

/// In-memory configuration source for tests and simple embedders.
#[derive(Default)]
pub struct StaticConfig {
    inner: RwLock<(GlobalSettings, Vec<StreamEntry>)>,
}

impl StaticConfig {
    pub fn new(global: GlobalSettings, entries: Vec<StreamEntry>) -> Self {
        Self {
            inner: RwLock::new((global, entries)),
        }
    }

    pub fn set_global(&self, global: GlobalSettings) {
        self.inner.write().0 = global;
    }

    pub fn set_entries(&self, entries: Vec<StreamEntry>) {
        self.inner.write().1 = entries;
    }
}

impl ConfigSource for StaticConfig {
    fn global(&self) -> GlobalSettings {
        self.inner.read().0.clone()
    }

    fn entries(&self) -> Vec<StreamEntry> {
        self.inner.read().1.clone()
    }
}
