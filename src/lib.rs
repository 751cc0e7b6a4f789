//! X-ui Usage Bot Library
//!
//! A Telegram bot that answers account usage queries from an x-ui panel.
//!
//! This crate provides the core functionality for:
//! - Logging in to the panel and fetching inbound/client statistics
//! - Building and atomically publishing client snapshots on a fixed interval
//! - Extracting account identifiers from ids, emails and connection links
//! - Rendering usage reports and answering chat messages

pub mod commands;
pub mod config;
pub mod panel;
pub mod refresh;
pub mod report;
pub mod snapshot;
pub mod telegram;
