//! Builds a [`Snapshot`] from one raw inbound listing.
//!
//! Two passes over the inbounds:
//! 1. Every client definition in `settings.clients` becomes a record keyed by
//!    email (a later definition with the same email replaces the earlier one).
//! 2. Every `clientStats` entry whose email has a definition is merged into
//!    that record; fields present in the stats overwrite the definition's.
//!
//! Stats without a matching definition are dropped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use super::{ClientRecord, Snapshot};
use crate::panel::{ClientStat, InboundSettings, RawClient, RawInbound};

/// Errors that can occur while building a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Inbound on port {port} has malformed settings: {source}")]
    Settings {
        port: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Builds a snapshot stamped with the current time.
pub fn build_snapshot(inbounds: &[RawInbound]) -> Result<Snapshot, SnapshotError> {
    build_snapshot_at(inbounds, Utc::now())
}

/// Builds a snapshot stamped with `now`.
fn build_snapshot_at(
    inbounds: &[RawInbound],
    now: DateTime<Utc>,
) -> Result<Snapshot, SnapshotError> {
    let mut clients: HashMap<String, ClientRecord> = HashMap::new();

    for inbound in inbounds {
        for client in parse_clients(inbound)? {
            let record = record_from_definition(&client, inbound.port);
            clients.insert(record.email.clone(), record);
        }
    }

    let mut dropped = 0usize;
    for inbound in inbounds {
        for stat in inbound.stats() {
            match clients.get_mut(&stat.email) {
                Some(record) => merge_stats(record, stat),
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} stats entries without a client definition", dropped);
    }

    Ok(Snapshot::new(clients, now))
}

fn parse_clients(inbound: &RawInbound) -> Result<Vec<RawClient>, SnapshotError> {
    if inbound.settings.trim().is_empty() {
        return Ok(Vec::new());
    }

    let settings: InboundSettings =
        serde_json::from_str(&inbound.settings).map_err(|source| SnapshotError::Settings {
            port: inbound.port,
            source,
        })?;

    Ok(settings.clients)
}

fn record_from_definition(client: &RawClient, port: u16) -> ClientRecord {
    let mut record = ClientRecord::new(client.uid(), client.email.clone(), port);
    record.total_bytes = client.total_gb.filter(|&total| total > 0);
    record.ip_limit = client.limit_ip.filter(|&limit| limit > 0);
    record.expiry_time = client.expiry_time.filter(|&expiry| expiry != 0);
    record.enable = client.enable.unwrap_or(true);
    record
}

fn merge_stats(record: &mut ClientRecord, stat: &ClientStat) {
    if let Some(up) = stat.up {
        record.up = up;
    }
    if let Some(down) = stat.down {
        record.down = down;
    }
    if let Some(enable) = stat.enable {
        record.enable = enable;
    }
    if let Some(expiry) = stat.expiry_time {
        record.expiry_time = (expiry != 0).then_some(expiry);
    }
    if let Some(total) = stat.total_gb {
        record.total_bytes = (total > 0).then_some(total);
    }
    if let Some(limit) = stat.limit_ip {
        record.ip_limit = (limit > 0).then_some(limit);
    }
}
