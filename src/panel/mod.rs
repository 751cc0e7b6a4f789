//! Panel API module.
//!
//! Authenticates against the x-ui panel and fetches the raw inbound
//! listing that snapshots are built from.

mod client;
mod types;

pub use client::{PanelClient, PanelError};
pub use types::{ApiResponse, ClientStat, InboundSettings, RawClient, RawInbound};
