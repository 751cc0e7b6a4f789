//! Background snapshot refresh module.
//!
//! Owns the panel client and republishes the client snapshot on a
//! fixed interval until shutdown.

mod runner;

pub use runner::{RefreshError, SnapshotRefresher};
