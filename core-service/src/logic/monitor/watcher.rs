//! Change Watcher
//!
//! Polls the Wi-Fi snapshot source and recomputes the report once per
//! change. The last observed marker advances only after a report was
//! handed to the broadcaster, so an empty or half-written snapshot is
//! retried on the next tick. I/O failures are logged and retried after
//! the backoff interval; only the stop signal ends the loop.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;

use super::broadcaster::Broadcaster;
use super::source::{SnapshotSource, SourceError};
use crate::logic::config::AssessmentConfig;
use crate::logic::features::network::NetworkRecord;
use crate::logic::threat::wifi::WifiThreatResolver;

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Marker not newer than the last one seen
    Unchanged,
    /// New report handed to the broadcaster
    Published,
    /// Marker advanced but the payload was empty or unreadable
    Deferred,
    SourceMissing,
    Failed,
}

impl TickOutcome {
    pub fn wants_backoff(&self) -> bool {
        matches!(self, TickOutcome::SourceMissing | TickOutcome::Failed)
    }
}

pub struct ChangeWatcher<S> {
    source: Arc<S>,
    resolver: WifiThreatResolver,
    broadcaster: Broadcaster,
    last_marker: Option<SystemTime>,
    poll_interval: Duration,
    backoff_interval: Duration,
}

impl<S> ChangeWatcher<S>
where
    S: SnapshotSource<Snapshot = Vec<NetworkRecord>>,
{
    pub fn new(source: Arc<S>, resolver: WifiThreatResolver, broadcaster: Broadcaster) -> Self {
        let defaults = AssessmentConfig::default();
        Self {
            source,
            resolver,
            broadcaster,
            last_marker: None,
            poll_interval: defaults.poll_interval(),
            backoff_interval: defaults.backoff_interval(),
        }
    }

    pub fn with_intervals(mut self, poll_interval: Duration, backoff_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.backoff_interval = backoff_interval;
        self
    }

    pub fn last_marker(&self) -> Option<SystemTime> {
        self.last_marker
    }

    /// Treat `marker` as already reported. Callers pass the marker they
    /// read before answering the snapshot themselves; anything written
    /// after it is newer and gets broadcast.
    pub fn seeded_with(mut self, marker: Option<SystemTime>) -> Self {
        self.last_marker = marker;
        self
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let marker = match self.blocking(|s| s.last_modified()).await {
            Ok(marker) => marker,
            Err(SourceError::Unavailable(reason)) => {
                log::debug!("Snapshot source missing: {}", reason);
                return TickOutcome::SourceMissing;
            }
            Err(e) => {
                log::warn!("Watcher error: {}", e);
                return TickOutcome::Failed;
            }
        };

        if self.last_marker.is_some_and(|last| marker <= last) {
            return TickOutcome::Unchanged;
        }

        log::info!("Change detected in {}, recomputing report", self.source.describe());

        let networks = match self.blocking(|s| s.fetch()).await {
            Ok(networks) => networks,
            Err(SourceError::Unavailable(reason)) => {
                log::debug!("Snapshot disappeared before read: {}", reason);
                return TickOutcome::SourceMissing;
            }
            Err(e @ SourceError::Malformed { .. }) => {
                log::warn!("Snapshot not usable yet: {}", e);
                return TickOutcome::Deferred;
            }
            Err(e) => {
                log::warn!("Watcher error: {}", e);
                return TickOutcome::Failed;
            }
        };

        if networks.is_empty() {
            log::debug!("Snapshot is empty, waiting for the next write");
            return TickOutcome::Deferred;
        }

        let report = self.resolver.resolve(&networks);
        let reached = self.broadcaster.publish(report);
        self.last_marker = Some(marker);

        log::info!("Report published to {} subscribers", reached);
        TickOutcome::Published
    }

    /// Poll until `stop` fires. An in-flight tick is abandoned on stop.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        log::info!(
            "Change watcher started on {} (poll {:?}, backoff {:?})",
            self.source.describe(),
            self.poll_interval,
            self.backoff_interval
        );

        loop {
            if *stop.borrow() {
                break;
            }

            let outcome = tokio::select! {
                _ = stop.changed() => break,
                outcome = self.tick() => outcome,
            };

            let delay = if outcome.wants_backoff() {
                self.backoff_interval
            } else {
                self.poll_interval
            };

            tokio::select! {
                _ = stop.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        log::info!("Change watcher stopped");
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R, SourceError>
    where
        R: Send + 'static,
        F: FnOnce(&S) -> Result<R, SourceError> + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || f(&source))
            .await
            .map_err(|e| SourceError::Io {
                origin: self.source.describe(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            })?
    }
}
