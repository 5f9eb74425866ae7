//! Bluetooth Threat Resolver
//!
//! Proximity plus a device-class hint derived from the advertised name.
//! First matching row wins:
//!
//! | distance  | condition                         | status   |
//! |-----------|-----------------------------------|----------|
//! | < 0.5 m   | audio/video, "sniffer" or "mic"   | CRITICAL |
//! | < 0.5 m   |                                   | HIGH     |
//! | < 3.0 m   | "mic" or audio/video              | HIGH     |
//! | < 3.0 m   |                                   | LOW      |
//! | otherwise |                                   | LOW      |

use chrono::Local;

use super::distance::PathLossModel;
use super::rules::{
    contains_any, AUDIO_VIDEO_NAME_KEYWORDS, IN_ROOM_DISTANCE_M, IN_ROOM_ESCALATION_KEYWORDS,
    MAJOR_CLASS_AUDIO_VIDEO, MAJOR_CLASS_PHONE, MAJOR_CLASS_UNKNOWN, PROXIMATE_DISTANCE_M,
    PROXIMATE_ESCALATION_KEYWORDS,
};
use super::types::{BluetoothDevice, BluetoothReport, BluetoothScan, DeviceThreat};

/// Timestamp layout shared by scans and reports
pub const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn scan_timestamp() -> String {
    Local::now().format(SCAN_TIME_FORMAT).to_string()
}

/// Major device class guessed from the advertised name
pub fn device_type_code(name: &str) -> u8 {
    if name.is_empty() {
        return MAJOR_CLASS_UNKNOWN;
    }

    if contains_any(&name.to_lowercase(), AUDIO_VIDEO_NAME_KEYWORDS) {
        MAJOR_CLASS_AUDIO_VIDEO
    } else {
        MAJOR_CLASS_PHONE
    }
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BluetoothThreatResolver {
    model: PathLossModel,
}

impl BluetoothThreatResolver {
    pub fn new(model: PathLossModel) -> Self {
        Self { model }
    }

    /// Assess one device. The address is left empty for the caller to attach.
    pub fn resolve(&self, rssi: i16, name: &str) -> BluetoothDevice {
        let distance = self.model.estimate(f64::from(rssi));
        let type_code = device_type_code(name);
        let name_lower = name.to_lowercase();
        let audio_video = type_code == MAJOR_CLASS_AUDIO_VIDEO;

        let (status, description) = if distance < PROXIMATE_DISTANCE_M {
            if audio_video || contains_any(&name_lower, PROXIMATE_ESCALATION_KEYWORDS) {
                (
                    DeviceThreat::Critical,
                    format!("Proximate Audio/Video, Sniffer, or Mic detected ({distance:.2}m). IMMEDIATE DANGER."),
                )
            } else {
                (
                    DeviceThreat::High,
                    format!(
                        "Unusually close device ({distance:.2}m). Potential for proximity attack (e.g., unauthorized pairing)."
                    ),
                )
            }
        } else if distance < IN_ROOM_DISTANCE_M {
            if audio_video || contains_any(&name_lower, IN_ROOM_ESCALATION_KEYWORDS) {
                (
                    DeviceThreat::High,
                    format!("Audio/Mic device detected within room ({distance:.2}m). Elevated risk of eavesdropping."),
                )
            } else {
                (
                    DeviceThreat::Low,
                    format!("Normal proximity detection ({distance:.2}m). Generally secure."),
                )
            }
        } else {
            (
                DeviceThreat::Low,
                format!("Safe distance ({distance:.2}m). Minimal threat risk."),
            )
        };

        BluetoothDevice {
            address: String::new(),
            name: name.to_string(),
            rssi,
            distance_m: round_2dp(distance),
            device_type_code: type_code,
            status,
            description,
        }
    }

    pub fn resolve_with_address(&self, address: &str, rssi: i16, name: &str) -> BluetoothDevice {
        BluetoothDevice {
            address: address.to_string(),
            ..self.resolve(rssi, name)
        }
    }
}

/// Highest status among `devices`, LOW when empty
pub fn max_threat(devices: &[BluetoothDevice]) -> DeviceThreat {
    let mut max = DeviceThreat::Low;
    for device in devices {
        match device.status {
            DeviceThreat::Critical => return DeviceThreat::Critical,
            DeviceThreat::High => max = DeviceThreat::High,
            DeviceThreat::Low => {}
        }
    }
    max
}

impl BluetoothReport {
    /// Drop devices beyond `proximity_limit` meters and summarize the rest
    pub fn from_scan(scan: BluetoothScan, proximity_limit: f64) -> Self {
        let detected = scan.devices.len();
        let devices: Vec<BluetoothDevice> = scan
            .devices
            .into_iter()
            .filter(|d| d.distance_m <= proximity_limit)
            .collect();

        log::debug!(
            "Bluetooth scan {}: {} of {} devices within {}m",
            scan.iteration,
            devices.len(),
            detected,
            proximity_limit
        );

        Self {
            max_threat: max_threat(&devices),
            scan_time: scan.scan_time,
            iteration: scan.iteration,
            devices,
        }
    }

    /// Report served when no scan is available yet
    pub fn empty() -> Self {
        Self {
            scan_time: scan_timestamp(),
            iteration: 0,
            devices: Vec::new(),
            max_threat: DeviceThreat::Low,
        }
    }
}
