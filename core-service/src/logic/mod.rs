//! Logic Module - Assessment engines
//!
//! - `features/` - Wi-Fi feature extraction (fixed layout)
//! - `model/` - Persisted pipeline stages & scoring
//! - `threat/` - Wi-Fi and Bluetooth threat resolvers
//! - `monitor/` - Change watcher & live broadcast

pub mod config;
pub mod features;
pub mod model;
pub mod monitor;
pub mod threat;
