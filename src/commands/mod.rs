//! Message handling module.
//!
//! Classifies incoming text, extracts the account identifier from raw
//! ids, emails or connection links and produces the reply.

mod extract;
mod handler;
mod types;

pub use extract::{extract_identifier, extract_vless, extract_vmess};
pub use handler::MessageHandler;
pub use types::BotQuery;
