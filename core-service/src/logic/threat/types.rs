//! Threat Types
//!
//! Core types for Wi-Fi and Bluetooth threat reports.
//! Data structures only. Logic lives in `wifi.rs`, `bluetooth.rs` and
//! `model::inference`.

use serde::{Deserialize, Deserializer, Serialize};

use super::bluetooth::scan_timestamp;
use crate::logic::features::network::NetworkRecord;
use crate::logic::features::vector::FeatureVector;

// ============================================================================
// STATISTICAL VERDICT
// ============================================================================

/// Verdict of the statistical pipeline.
///
/// `NoNetworksFound` is never produced by the pipeline itself; it is the
/// terminal state of a Wi-Fi report with nothing to assess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Benign,
    Threat,
    ProcessingError,
    NoNetworksFound,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Benign => "BENIGN",
            RiskLevel::Threat => "THREAT",
            RiskLevel::ProcessingError => "PROCESSING_ERROR",
            RiskLevel::NoNetworksFound => "NO_NETWORKS_FOUND",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of `FeaturePipeline::score`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredSignal {
    pub feature_vector: FeatureVector,
    pub anomaly_score: f64,
    pub risk_level: RiskLevel,
}

// ============================================================================
// WI-FI
// ============================================================================

/// User-facing severity of the connected Wi-Fi network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatTier {
    Low,
    Mild,
    High,
    Critical,
}

impl ThreatTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatTier::Low => "LOW",
            ThreatTier::Mild => "MILD",
            ThreatTier::High => "HIGH",
            ThreatTier::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for ThreatTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report for the connected Wi-Fi network.
///
/// Built fresh on every recomputation. Wire names match the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiReport {
    #[serde(rename = "result")]
    pub risk_level: RiskLevel,
    #[serde(rename = "score")]
    pub anomaly_score: f64,
    #[serde(rename = "raw_features")]
    pub feature_vector: FeatureVector,
    pub ssid: String,
    #[serde(rename = "networks")]
    pub observed_networks: Vec<NetworkRecord>,
    pub threat_tier: ThreatTier,
}

// ============================================================================
// BLUETOOTH
// ============================================================================

/// Severity of a single Bluetooth device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceThreat {
    Low,
    High,
    Critical,
}

impl DeviceThreat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceThreat::Low => "LOW",
            DeviceThreat::High => "HIGH",
            DeviceThreat::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for DeviceThreat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assessed Bluetooth device in one scan cycle.
///
/// Only distance and status are required when reading a hand-off file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothDevice {
    #[serde(default)]
    pub address: String,
    #[serde(rename = "device_name", default)]
    pub name: String,
    #[serde(rename = "rssi_dbm", default)]
    pub rssi: i16,
    pub distance_m: f64,
    #[serde(default)]
    pub device_type_code: u8,
    pub status: DeviceThreat,
    #[serde(default)]
    pub description: String,
}

/// Snapshot of one scan cycle, as handed over by the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BluetoothScan {
    #[serde(default = "scan_timestamp")]
    pub scan_time: String,
    #[serde(default = "first_iteration")]
    pub iteration: u64,
    #[serde(default)]
    pub devices_detected: usize,
    #[serde(default, deserialize_with = "readable_devices")]
    pub devices: Vec<BluetoothDevice>,
}

fn first_iteration() -> u64 {
    1
}

/// Entries that cannot be read (no distance, unknown status) are dropped
/// one by one; the rest of the scan stays usable.
fn readable_devices<'de, D>(deserializer: D) -> Result<Vec<BluetoothDevice>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(entries
        .into_iter()
        .filter_map(|entry| match BluetoothDevice::deserialize(entry) {
            Ok(device) => Some(device),
            Err(e) => {
                log::warn!("Skipping unreadable Bluetooth device entry: {}", e);
                None
            }
        })
        .collect())
}

/// Proximity-filtered view of a scan cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "BluetoothReportEnvelope")]
pub struct BluetoothReport {
    pub scan_time: String,
    pub iteration: u64,
    pub devices: Vec<BluetoothDevice>,
    pub max_threat: DeviceThreat,
}

/// Wire layout of `BluetoothReport`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BluetoothReportEnvelope {
    pub metadata: ScanMetadata,
    pub bluetooth: BluetoothSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_time: String,
    pub iteration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BluetoothSummary {
    pub devices_detected: usize,
    pub devices: Vec<BluetoothDevice>,
    pub max_threat: DeviceThreat,
}

impl From<BluetoothReport> for BluetoothReportEnvelope {
    fn from(report: BluetoothReport) -> Self {
        Self {
            metadata: ScanMetadata {
                scan_time: report.scan_time,
                iteration: report.iteration,
            },
            bluetooth: BluetoothSummary {
                devices_detected: report.devices.len(),
                devices: report.devices,
                max_threat: report.max_threat,
            },
        }
    }
}
