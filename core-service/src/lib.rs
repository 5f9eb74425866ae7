//! WHISPR Core - Signal threat assessment
//!
//! Scores the connected Wi-Fi network against a one-class model, tiers
//! nearby Bluetooth devices by proximity, and keeps live subscribers
//! informed as the Wi-Fi snapshot changes.

pub mod constants;
pub mod logic;

pub use logic::config::AssessmentConfig;
pub use logic::features::{FeatureVector, NetworkRecord};
pub use logic::model::{EngineStatus, FeaturePipeline, ModelError, ThreatThreshold};
pub use logic::monitor::{
    Broadcaster, ChangeWatcher, JsonFileSource, MemorySource, SharedReport, SnapshotSource, SourceError,
    TickOutcome, WatcherSupervisor,
};
pub use logic::threat::{
    Advertisement, AdvertisementCollector, BluetoothDevice, BluetoothReport, BluetoothScan,
    BluetoothThreatResolver, DeviceThreat, PathLossModel, RiskLevel, ThreatTier, WifiReport,
    WifiThreatResolver,
};
