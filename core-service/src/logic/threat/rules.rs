//! Threat Classification Rules & Constants
//!
//! Keyword lists, calibration constants and distance bands.
//! No classification logic lives here.
//!
//! The keyword lists are plain substring rules and intentionally simple;
//! changing them changes observable tiering.

// ============================================================================
// WI-FI
// ============================================================================

/// Authentication substrings that mark a network as secure
pub const SECURE_AUTH_KEYWORDS: &[&str] = &["wpa", "wpa2", "wpa3"];

/// SSID substrings of well-known public venues
pub const PUBLIC_SSID_KEYWORDS: &[&str] = &["guest", "free", "public", "cafe", "airport", "hotel"];

/// Signal quality assumed when the bridge value is unusable
pub const DEFAULT_SIGNAL_PERCENT: f64 = 70.0;

/// SSID reported when there is no connected network
pub const NO_NETWORK_SSID: &str = "N/A";

// ============================================================================
// BLUETOOTH PATH LOSS
// ============================================================================

/// Expected RSSI (dBm) at one meter
pub const RSSI_AT_1M: f64 = -59.0;

/// Environment dependent path-loss exponent
pub const PATH_LOSS_EXPONENT: f64 = 2.8;

/// Distance reported for signals at or above the 1 m reference
pub const FLOOR_DISTANCE_M: f64 = 0.1;

// ============================================================================
// BLUETOOTH DEVICE CLASSES (CoD major class)
// ============================================================================

pub const MAJOR_CLASS_UNKNOWN: u8 = 0x00;
pub const MAJOR_CLASS_PHONE: u8 = 0x02;
pub const MAJOR_CLASS_AUDIO_VIDEO: u8 = 0x04;

/// Name substrings that mark a device as audio/video
pub const AUDIO_VIDEO_NAME_KEYWORDS: &[&str] = &["mic", "headset", "speaker"];

/// Name substrings escalated when the device is within touching range
pub const PROXIMATE_ESCALATION_KEYWORDS: &[&str] = &["sniffer", "mic"];

/// Name substrings escalated when the device is in the same room
pub const IN_ROOM_ESCALATION_KEYWORDS: &[&str] = &["mic"];

// ============================================================================
// BLUETOOTH DISTANCE BANDS (meters)
// ============================================================================

/// Closer than this is "touching" range
pub const PROXIMATE_DISTANCE_M: f64 = 0.5;

/// Closer than this is "same room"
pub const IN_ROOM_DISTANCE_M: f64 = 3.0;

// ============================================================================
// HELPERS
// ============================================================================

/// Substring match of any keyword. `haystack` must already be lowercased.
pub fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}
