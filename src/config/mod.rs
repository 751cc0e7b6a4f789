//! Configuration module for the usage bot.
//!
//! Handles loading of the panel credentials, refresh timings and
//! Telegram API credentials from the environment.

mod settings;

pub use settings::{ConfigError, PanelConfig, TelegramConfig};
