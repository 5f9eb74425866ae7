//! Watcher Supervisor
//!
//! Guarantees at most one background change watcher per process.

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::source::SnapshotSource;
use super::watcher::ChangeWatcher;
use crate::logic::features::network::NetworkRecord;

struct RunningWatcher {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct WatcherSupervisor {
    running: Mutex<Option<RunningWatcher>>,
}

impl WatcherSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the watcher built by `make` unless one is already running.
    /// Returns true when a new watcher was started. The watcher keeps the
    /// marker it was built with; `make` is not called when one is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn ensure_started<S, F>(&self, make: F) -> bool
    where
        S: SnapshotSource<Snapshot = Vec<NetworkRecord>>,
        F: FnOnce() -> ChangeWatcher<S>,
    {
        let mut running = self.running.lock();

        if let Some(current) = running.as_ref() {
            if !current.handle.is_finished() {
                return false;
            }
            log::warn!("Previous change watcher exited, starting a new one");
        }

        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(make().run(stop_rx));

        *running = Some(RunningWatcher { stop, handle });
        log::info!("Started background change watcher");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Signal the watcher and wait for it to exit. Returns false when
    /// nothing was running.
    pub async fn stop(&self) -> bool {
        let Some(current) = self.running.lock().take() else {
            return false;
        };

        // Receiver gone means the task already ended
        let _ = current.stop.send(true);
        if let Err(e) = current.handle.await {
            log::error!("Change watcher task failed: {}", e);
        }
        true
    }
}

impl std::fmt::Debug for WatcherSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherSupervisor")
            .field("running", &self.is_running())
            .finish()
    }
}
