//! Snapshot refresh loop.
//!
//! Each cycle either succeeds (fetch → build → publish) or fails; both are
//! followed by the same fixed sleep. A failed cycle leaves the published
//! snapshot untouched. Nothing inside a cycle is fatal, the loop only ends
//! when its cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::panel::{PanelClient, PanelError};
use crate::snapshot::{SnapshotError, SnapshotStore, build_snapshot};

/// Reasons a refresh cycle was skipped.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Panel login has not succeeded yet")]
    NotLoggedIn,

    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Periodically rebuilds the client snapshot from the panel.
pub struct SnapshotRefresher {
    /// Panel client, exclusively owned by the refresher.
    panel: PanelClient,

    /// Store the finished snapshots are published to.
    store: Arc<SnapshotStore>,

    /// Sleep between cycles.
    interval: Duration,
}

impl SnapshotRefresher {
    /// Creates a refresher using the panel's configured interval.
    #[must_use]
    pub fn new(panel: PanelClient, store: Arc<SnapshotStore>) -> Self {
        let interval = panel.config().refresh_interval();
        Self {
            panel,
            store,
            interval,
        }
    }

    /// Overrides the sleep between cycles.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs refresh cycles until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let interval = self.interval;
        info!(
            "Snapshot refresher started (interval: {}s)",
            interval.as_secs()
        );

        loop {
            tokio::select! {
                result = self.refresh_once() => match result {
                    Ok(count) => info!("Snapshot refreshed: {} clients", count),
                    Err(e) => warn!(
                        "Refresh failed, retrying in {}s: {}",
                        interval.as_secs(),
                        e
                    ),
                },
                () = cancel.cancelled() => break,
            }

            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = cancel.cancelled() => break,
            }
        }

        info!("Snapshot refresher shutting down");
    }

    /// Runs a single cycle and returns the number of published records.
    pub async fn refresh_once(&mut self) -> Result<usize, RefreshError> {
        if !self.panel.has_session() && !self.panel.login().await {
            return Err(RefreshError::NotLoggedIn);
        }

        let inbounds = match self.panel.fetch_inbounds().await {
            Ok(inbounds) => inbounds,
            Err(e) => {
                if self.panel.config().relogin && e.is_session_rejection() {
                    debug!("Panel rejected the session, logging in again next cycle");
                    self.panel.clear_session();
                }
                return Err(e.into());
            }
        };

        let snapshot = build_snapshot(&inbounds)?;
        let count = snapshot.len();
        self.store.publish(snapshot);

        Ok(count)
    }
}

impl std::fmt::Debug for SnapshotRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRefresher")
            .field("panel", &self.panel)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
