//! Monitor Module - Live change detection & fan-out
//!
//! ## Structure
//! - `source`: Snapshot sources (JSON file, in-memory)
//! - `watcher`: Polls a source, recomputes once per change
//! - `broadcaster`: Delivers reports to current subscribers
//! - `supervisor`: Single background watcher per process
//!
//! ## Flow
//! ```text
//! source ──(marker newer?)──> WifiThreatResolver ──> Broadcaster ──> subscribers
//! ```

pub mod broadcaster;
pub mod source;
pub mod supervisor;
pub mod watcher;

#[cfg(test)]
mod tests;

pub use broadcaster::{Broadcaster, SharedReport};
pub use source::{JsonFileSource, MemorySource, SnapshotSource, SourceError};
pub use supervisor::WatcherSupervisor;
pub use watcher::{ChangeWatcher, TickOutcome};
