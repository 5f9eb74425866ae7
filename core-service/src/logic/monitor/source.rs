//! Snapshot Sources
//!
//! Where sensor snapshots come from. Calls are blocking; async callers
//! run them on the blocking pool.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::constants::{DEFAULT_MAX_READ_ATTEMPTS, READ_RETRY_DELAY_MS};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Nothing to read yet
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed snapshot in {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("I/O error on {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// External data source with a freshness marker
pub trait SnapshotSource: Send + Sync + 'static {
    type Snapshot: Send + 'static;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;

    /// Marker that grows whenever the snapshot is replaced
    fn last_modified(&self) -> Result<SystemTime, SourceError>;

    fn fetch(&self) -> Result<Self::Snapshot, SourceError>;
}

// ============================================================================
// JSON FILE SOURCE
// ============================================================================

/// JSON document rewritten in place by an external bridge process.
///
/// The writer does not replace the file atomically, so a read can observe
/// a half-written document; reads are retried a bounded number of times.
#[derive(Debug)]
pub struct JsonFileSource<T> {
    path: PathBuf,
    max_attempts: u32,
    retry_delay: Duration,
    _snapshot: PhantomData<fn() -> T>,
}

impl<T> JsonFileSource<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_attempts: DEFAULT_MAX_READ_ATTEMPTS,
            retry_delay: Duration::from_millis(READ_RETRY_DELAY_MS),
            _snapshot: PhantomData,
        }
    }

    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        if source.kind() == ErrorKind::NotFound {
            SourceError::Unavailable(format!("{} does not exist", self.path.display()))
        } else {
            SourceError::Io {
                origin: self.path.display().to_string(),
                source,
            }
        }
    }
}

impl<T: DeserializeOwned + Send + 'static> JsonFileSource<T> {
    fn read_once(&self) -> Result<T, SourceError> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&text).map_err(|e| SourceError::Malformed {
            origin: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl<T: DeserializeOwned + Send + 'static> SnapshotSource for JsonFileSource<T> {
    type Snapshot = T;

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn last_modified(&self) -> Result<SystemTime, SourceError> {
        fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|e| self.io_error(e))
    }

    fn fetch(&self) -> Result<T, SourceError> {
        let mut attempt = 1;
        loop {
            match self.read_once() {
                Ok(snapshot) => return Ok(snapshot),
                Err(e @ SourceError::Unavailable(_)) => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    log::warn!("Giving up on {} after {} attempts: {}", self.path.display(), attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    log::debug!("Read attempt {} of {} failed: {}", attempt, self.path.display(), e);
                    attempt += 1;
                    thread::sleep(self.retry_delay);
                }
            }
        }
    }
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

#[derive(Debug)]
struct MemoryState<T> {
    snapshot: Option<T>,
    modified: SystemTime,
}

/// Snapshot handed over in-process, e.g. by an embedded scanner
#[derive(Debug)]
pub struct MemorySource<T> {
    name: String,
    state: RwLock<MemoryState<T>>,
}

impl<T: Clone> MemorySource<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(MemoryState {
                snapshot: None,
                modified: SystemTime::UNIX_EPOCH,
            }),
        }
    }

    /// Replace the snapshot and advance the marker
    pub fn publish(&self, snapshot: T) {
        let mut state = self.state.write();
        state.snapshot = Some(snapshot);
        state.modified = next_marker(state.modified);
    }

    /// Advance the marker without changing the snapshot
    pub fn touch(&self) {
        let mut state = self.state.write();
        state.modified = next_marker(state.modified);
    }

    pub fn clear(&self) {
        self.state.write().snapshot = None;
    }
}

fn next_marker(previous: SystemTime) -> SystemTime {
    let now = SystemTime::now();
    if now > previous {
        now
    } else {
        previous + Duration::from_millis(1)
    }
}

impl<T: Clone + Send + Sync + 'static> SnapshotSource for MemorySource<T> {
    type Snapshot = T;

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn last_modified(&self) -> Result<SystemTime, SourceError> {
        let state = self.state.read();
        match state.snapshot {
            Some(_) => Ok(state.modified),
            None => Err(SourceError::Unavailable(self.describe())),
        }
    }

    fn fetch(&self) -> Result<T, SourceError> {
        self.state
            .read()
            .snapshot
            .clone()
            .ok_or_else(|| SourceError::Unavailable(self.describe()))
    }
}
