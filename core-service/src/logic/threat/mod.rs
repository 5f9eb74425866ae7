//! Threat Module
//!
//! Turns sensor snapshots into user-facing threat reports.
//!
//! ## Structure
//! - `types`: Report types (WifiReport, BluetoothDevice, BluetoothReport, ...)
//! - `rules`: Keyword lists, calibration constants, distance bands
//! - `distance`: RSSI → meters (log-distance path loss)
//! - `wifi`: Wi-Fi heuristic tiering + statistical reconciliation
//! - `bluetooth`: Proximity and device-class tiering
//! - `collector`: Per-cycle BLE advertisement aggregation
//!
//! ## Usage
//! ```ignore
//! use crate::logic::threat::WifiThreatResolver;
//!
//! let report = resolver.resolve(&networks);
//! if report.threat_tier == ThreatTier::Critical {
//!     // alert
//! }
//! ```

pub mod types;
pub mod rules;
pub mod distance;
pub mod wifi;
pub mod bluetooth;
pub mod collector;

pub use types::{
    BluetoothDevice,
    BluetoothReport,
    BluetoothScan,
    DeviceThreat,
    RiskLevel,
    ScoredSignal,
    ThreatTier,
    WifiReport,
};

pub use distance::PathLossModel;
pub use wifi::WifiThreatResolver;
pub use bluetooth::BluetoothThreatResolver;
pub use collector::{Advertisement, AdvertisementCollector};
