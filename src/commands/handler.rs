//! Message handler: query → lookup → report.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::BotQuery;
use crate::report::{NOT_FOUND, START_PROMPT, render_report};
use crate::snapshot::SnapshotStore;

/// Answers incoming text messages from the current snapshot.
#[derive(Debug, Clone)]
pub struct MessageHandler {
    /// Shared snapshot store, read-only from here.
    store: Arc<SnapshotStore>,
}

impl MessageHandler {
    /// Creates a new message handler.
    #[must_use]
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// Produces the reply for `text`.
    #[must_use]
    pub fn handle(&self, text: &str) -> String {
        self.handle_at(text, Utc::now())
    }

    /// Produces the reply for `text`, computing remaining time against `now`.
    #[must_use]
    pub fn handle_at(&self, text: &str, now: DateTime<Utc>) -> String {
        let query = BotQuery::parse(text);
        debug!("Handling query: {}", truncate(&query.to_string(), 60));

        if query == BotQuery::Start {
            return START_PROMPT.to_owned();
        }

        query
            .key()
            .and_then(|key| self.store.find(key))
            .map_or_else(|| NOT_FOUND.to_owned(), |record| render_report(&record, now))
    }
}

/// Truncates a string for logging.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}
