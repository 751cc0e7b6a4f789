//! Telegram transport module.
//!
//! Connects as a bot over `MTProto`, receives private text messages and
//! sends the handler's replies back.

mod client;

pub use client::{TelegramBot, TelegramError};
