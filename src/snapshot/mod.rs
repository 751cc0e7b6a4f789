//! Client snapshot module.
//!
//! Turns one raw panel listing into an immutable email-keyed snapshot
//! and publishes it for lookups.

mod builder;
mod record;
mod store;

pub use builder::{SnapshotError, build_snapshot};
pub use record::{ClientRecord, PortSummary, Snapshot};
pub use store::SnapshotStore;
