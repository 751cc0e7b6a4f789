//! Report formatting module.
//!
//! Turns a client record into the Persian reply text: byte counts,
//! quota sentinels, status and remaining time.

mod bytes;
mod render;

pub use bytes::humanize_bytes;
pub use render::{
    NOT_FOUND, START_PROMPT, expires_at, expiry_epoch_secs, format_remaining, remaining_secs,
    render_report,
};
