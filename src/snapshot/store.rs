//! Shared, atomically replaced snapshot and the lookups served from it.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::{ClientRecord, Snapshot};

/// Holds the most recently published snapshot.
///
/// Written only by the refresher; every lookup loads the current snapshot
/// once, so a concurrent publish never produces a torn read.
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates a store holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Atomically replaces the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Finds a client by the identifier in its connection link.
    #[must_use]
    pub fn find_by_uid(&self, uid: &str) -> Option<ClientRecord> {
        self.current.load().find_by_uid(uid).cloned()
    }

    /// Finds a client by email.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<ClientRecord> {
        self.current.load().get_by_email(email).cloned()
    }

    /// Tries `key` as a uid first, then as an email, against one snapshot.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<ClientRecord> {
        let snapshot = self.current.load();
        snapshot
            .find_by_uid(key)
            .or_else(|| snapshot.get_by_email(key))
            .cloned()
    }
}
