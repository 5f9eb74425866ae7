//! Change watcher & supervisor tests

use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::broadcaster::Broadcaster;
use super::source::{JsonFileSource, MemorySource, SnapshotSource, SourceError};
use super::supervisor::WatcherSupervisor;
use super::watcher::{ChangeWatcher, TickOutcome};
use crate::logic::features::network::NetworkRecord;
use crate::logic::model::testing::benign_pipeline;
use crate::logic::threat::types::ThreatTier;
use crate::logic::threat::wifi::WifiThreatResolver;

type WifiSource = MemorySource<Vec<NetworkRecord>>;

fn networks(ssid: &str, auth: &str) -> Vec<NetworkRecord> {
    networks_at(ssid, auth, "80%")
}

fn networks_at(ssid: &str, auth: &str, signal: &str) -> Vec<NetworkRecord> {
    vec![NetworkRecord::new()
        .with("SSID", ssid)
        .with("Authentication", auth)
        .with("Signal (%)", signal)]
}

/// Memory source whose marker read fails with an I/O error while `broken`
struct FlakySource {
    inner: WifiSource,
    broken: AtomicBool,
}

impl FlakySource {
    fn new() -> Self {
        Self {
            inner: WifiSource::new("flaky"),
            broken: AtomicBool::new(false),
        }
    }

    fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }
}

impl SnapshotSource for FlakySource {
    type Snapshot = Vec<NetworkRecord>;

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn last_modified(&self) -> Result<SystemTime, SourceError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(SourceError::Io {
                origin: self.describe(),
                source: Error::new(ErrorKind::PermissionDenied, "access denied"),
            });
        }
        self.inner.last_modified()
    }

    fn fetch(&self) -> Result<Self::Snapshot, SourceError> {
        self.inner.fetch()
    }
}

fn watcher(source: Arc<WifiSource>, broadcaster: &Broadcaster) -> ChangeWatcher<WifiSource> {
    ChangeWatcher::new(source, WifiThreatResolver::new(benign_pipeline()), broadcaster.clone())
        .with_intervals(Duration::from_millis(10), Duration::from_millis(50))
}

#[tokio::test]
async fn test_seeded_snapshot_is_not_republished() {
    let source = Arc::new(WifiSource::new("wifi"));
    source.publish(networks("HomeNet", "WPA2-Personal"));

    let seen = source.last_modified().ok();
    let broadcaster = Broadcaster::new(8);
    let mut w = watcher(source.clone(), &broadcaster).seeded_with(seen);

    assert!(w.last_marker().is_some());
    assert_eq!(w.tick().await, TickOutcome::Unchanged);
    assert_eq!(broadcaster.published_count(), 0);
}

#[tokio::test]
async fn test_change_is_published_once() {
    let source = Arc::new(WifiSource::new("wifi"));
    let broadcaster = Broadcaster::new(8);
    let mut rx = broadcaster.subscribe();
    let mut w = watcher(source.clone(), &broadcaster);

    source.publish(networks_at("Free Airport WiFi", "Open", "50%"));

    assert_eq!(w.tick().await, TickOutcome::Published);
    assert_eq!(w.tick().await, TickOutcome::Unchanged);

    let report = rx.recv().await.unwrap();
    assert_eq!(report.ssid, "Free Airport WiFi");
    assert_eq!(report.threat_tier, ThreatTier::Mild);
    assert_eq!(broadcaster.published_count(), 1);
}

#[tokio::test]
async fn test_empty_payload_keeps_marker() {
    let source = Arc::new(WifiSource::new("wifi"));
    let broadcaster = Broadcaster::new(8);
    let mut w = watcher(source.clone(), &broadcaster);

    source.publish(networks("HomeNet", "WPA2-Personal"));
    assert_eq!(w.tick().await, TickOutcome::Published);
    let marker = w.last_marker();

    source.publish(Vec::new());
    assert_eq!(w.tick().await, TickOutcome::Deferred);
    assert_eq!(w.last_marker(), marker);

    // Still pending, so the next tick retries
    assert_eq!(w.tick().await, TickOutcome::Deferred);

    source.publish(networks("HomeNet", "WPA3-SAE"));
    assert_eq!(w.tick().await, TickOutcome::Published);
    assert!(w.last_marker() > marker);
}

#[tokio::test]
async fn test_missing_source_backs_off() {
    let source = Arc::new(WifiSource::new("wifi"));
    let broadcaster = Broadcaster::new(8);
    let mut w = watcher(source, &broadcaster);

    let outcome = w.tick().await;
    assert_eq!(outcome, TickOutcome::SourceMissing);
    assert!(outcome.wants_backoff());
    assert!(w.last_marker().is_none());
}

#[tokio::test]
async fn test_half_written_file_is_deferred() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan_results.json");
    std::fs::write(&path, r#"[{"SSID": "Home"#).unwrap();

    let source = Arc::new(
        JsonFileSource::<Vec<NetworkRecord>>::new(&path).with_retries(2, Duration::from_millis(1)),
    );
    let broadcaster = Broadcaster::new(8);
    let mut w = ChangeWatcher::new(source, WifiThreatResolver::new(benign_pipeline()), broadcaster);

    assert_eq!(w.tick().await, TickOutcome::Deferred);
    assert!(w.last_marker().is_none());

    std::fs::write(&path, r#"[{"SSID": "Home", "Authentication": "WPA2"}]"#).unwrap();
    assert_eq!(w.tick().await, TickOutcome::Published);
}

#[tokio::test]
async fn test_supervisor_start_is_idempotent() {
    let source = Arc::new(WifiSource::new("wifi"));
    let broadcaster = Broadcaster::new(8);
    let supervisor = WatcherSupervisor::new();

    assert!(supervisor.ensure_started(|| watcher(source.clone(), &broadcaster)));
    assert!(!supervisor.ensure_started(|| watcher(source.clone(), &broadcaster)));
    assert!(supervisor.is_running());

    assert!(supervisor.stop().await);
    assert!(!supervisor.is_running());
    assert!(!supervisor.stop().await);

    // Can be started again after an explicit stop
    assert!(supervisor.ensure_started(|| watcher(source.clone(), &broadcaster)));
    assert!(supervisor.stop().await);
}

#[tokio::test]
async fn test_running_watcher_broadcasts_changes() {
    let source = Arc::new(WifiSource::new("wifi"));
    source.publish(networks("HomeNet", "WPA2-Personal"));

    let broadcaster = Broadcaster::new(8);
    let mut rx = broadcaster.subscribe();
    let supervisor = WatcherSupervisor::new();

    // Already answered by the caller
    let seen = source.last_modified().ok();
    supervisor.ensure_started(|| watcher(source.clone(), &broadcaster).seeded_with(seen));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(broadcaster.published_count(), 0);
    source.publish(networks("Hotel Guest", "Open"));

    let report = tokio_test::assert_ok!(tokio::time::timeout(Duration::from_secs(2), rx.recv()).await).unwrap();
    assert_eq!(report.ssid, "Hotel Guest");

    supervisor.stop().await;
}

#[tokio::test]
async fn test_stop_interrupts_backoff() {
    let source = Arc::new(WifiSource::new("wifi"));
    let broadcaster = Broadcaster::new(8);
    let supervisor = WatcherSupervisor::new();

    supervisor.ensure_started(|| {
        watcher(source.clone(), &broadcaster).with_intervals(Duration::from_secs(3600), Duration::from_secs(3600))
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let stopped = tokio::time::timeout(Duration::from_secs(1), supervisor.stop()).await;
    assert!(matches!(stopped, Ok(true)));
}

#[tokio::test]
async fn test_io_failure_backs_off() {
    let source = Arc::new(FlakySource::new());
    source.inner.publish(networks("HomeNet", "WPA2-Personal"));
    source.set_broken(true);

    let broadcaster = Broadcaster::new(8);
    let mut w = ChangeWatcher::new(source.clone(), WifiThreatResolver::new(benign_pipeline()), broadcaster);

    let outcome = w.tick().await;
    assert_eq!(outcome, TickOutcome::Failed);
    assert!(outcome.wants_backoff());
    assert!(w.last_marker().is_none());

    source.set_broken(false);
    assert_eq!(w.tick().await, TickOutcome::Published);
}

#[tokio::test]
async fn test_running_watcher_survives_io_failure() {
    let source = Arc::new(FlakySource::new());
    source.set_broken(true);

    let broadcaster = Broadcaster::new(8);
    let mut rx = broadcaster.subscribe();
    let supervisor = WatcherSupervisor::new();
    supervisor.ensure_started(|| {
        ChangeWatcher::new(source.clone(), WifiThreatResolver::new(benign_pipeline()), broadcaster.clone())
            .with_intervals(Duration::from_millis(10), Duration::from_millis(20))
    });

    // Several failing ticks
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(supervisor.is_running());

    source.inner.publish(networks("HomeNet", "WPA2-Personal"));
    source.set_broken(false);

    let report = tokio_test::assert_ok!(tokio::time::timeout(Duration::from_secs(2), rx.recv()).await).unwrap();
    assert_eq!(report.ssid, "HomeNet");

    supervisor.stop().await;
}

#[tokio::test]
async fn test_write_after_caller_read_is_broadcast() {
    let source = Arc::new(WifiSource::new("wifi"));
    source.publish(networks("HomeNet", "WPA2-Personal"));

    // Caller reads the marker and answers the snapshot, then a new scan
    // lands before the watcher task gets to run
    let seen = source.last_modified().ok();
    source.publish(networks("Hotel Guest", "Open"));

    let broadcaster = Broadcaster::new(8);
    let mut rx = broadcaster.subscribe();
    let supervisor = WatcherSupervisor::new();
    supervisor.ensure_started(|| watcher(source.clone(), &broadcaster).seeded_with(seen));

    let report = tokio_test::assert_ok!(tokio::time::timeout(Duration::from_secs(2), rx.recv()).await).unwrap();
    assert_eq!(report.ssid, "Hotel Guest");

    // Delivered once
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(broadcaster.published_count(), 1);

    supervisor.stop().await;
}
