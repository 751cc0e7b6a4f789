//! Normalized client records and the snapshot that holds them.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

/// One panel client with its quota and usage counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRecord {
    /// Identifier embedded in the client's connection links.
    pub uid: String,

    /// Human-facing name, unique within a snapshot.
    pub email: String,

    /// Port of the inbound the client belongs to.
    pub port: u16,

    /// Traffic quota in bytes, `None` when unlimited.
    pub total_bytes: Option<u64>,

    /// Simultaneous connection limit, `None` when unlimited.
    pub ip_limit: Option<u32>,

    pub up: u64,

    pub down: u64,

    pub enable: bool,

    /// Raw panel expiry value, `None` when the account never expires.
    pub expiry_time: Option<i64>,
}

impl ClientRecord {
    /// Creates a record with zeroed counters and no limits.
    #[must_use]
    pub fn new(uid: impl Into<String>, email: impl Into<String>, port: u16) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            port,
            total_bytes: None,
            ip_limit: None,
            up: 0,
            down: 0,
            enable: true,
            expiry_time: None,
        }
    }

    /// Combined upload and download.
    #[must_use]
    pub const fn used_bytes(&self) -> u64 {
        self.up.saturating_add(self.down)
    }
}

/// Traffic totals for all clients on one port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortSummary {
    pub port: u16,
    pub clients: usize,
    pub enabled: usize,
    pub up: u64,
    pub down: u64,
}

/// Immutable view of every client as of one refresh.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    clients: HashMap<String, ClientRecord>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Wraps a finished email-keyed mapping.
    #[must_use]
    pub fn new(clients: HashMap<String, ClientRecord>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            clients,
            refreshed_at: Some(refreshed_at),
        }
    }

    /// When this snapshot was built; `None` for the empty startup snapshot.
    #[must_use]
    pub const fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Direct lookup by email.
    #[must_use]
    pub fn get_by_email(&self, email: &str) -> Option<&ClientRecord> {
        self.clients.get(email)
    }

    /// Linear scan for the record carrying `uid`.
    #[must_use]
    pub fn find_by_uid(&self, uid: &str) -> Option<&ClientRecord> {
        if uid.is_empty() {
            return None;
        }
        self.clients.values().find(|record| record.uid == uid)
    }

    /// Groups records by port, ordered by port number.
    #[must_use]
    pub fn port_summaries(&self) -> Vec<PortSummary> {
        let mut by_port: BTreeMap<u16, PortSummary> = BTreeMap::new();

        for record in self.clients.values() {
            let summary = by_port.entry(record.port).or_insert_with(|| PortSummary {
                port: record.port,
                ..PortSummary::default()
            });
            summary.clients += 1;
            if record.enable {
                summary.enabled += 1;
            }
            summary.up = summary.up.saturating_add(record.up);
            summary.down = summary.down.saturating_add(record.down);
        }

        by_port.into_values().collect()
    }
}
