//! Wi-Fi Network Features
//!
//! Turns the raw record of the connected network into the synthetic
//! five-feature profile scored by the model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::vector::{FeatureVector, FeatureVectorBuilder};
use crate::logic::threat::rules::{
    contains_any, DEFAULT_SIGNAL_PERCENT, PUBLIC_SSID_KEYWORDS, SECURE_AUTH_KEYWORDS,
};

// ============================================================================
// RAW NETWORK RECORD
// ============================================================================

pub const SSID_KEY: &str = "SSID";
pub const AUTHENTICATION_KEY: &str = "Authentication";
/// Key used by the Linux bridge instead of `Authentication`
pub const SECURITY_KEY: &str = "Security";
pub const SIGNAL_KEY: &str = "Signal (%)";

/// One network record as written by the scan bridge.
///
/// Unknown fields are kept so the record can be echoed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkRecord(Map<String, Value>);

impl NetworkRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert, mostly for hosts and tests
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// SSID as written by the bridge, empty when absent
    pub fn ssid(&self) -> String {
        self.text(SSID_KEY).unwrap_or_default()
    }

    /// Authentication / security description, `"N/A"` when absent
    pub fn authentication(&self) -> String {
        self.text(AUTHENTICATION_KEY)
            .or_else(|| self.text(SECURITY_KEY))
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Signal quality in percent; unparseable or missing ⇒ 70.0
    pub fn signal_percent(&self) -> f64 {
        let parsed = match self.get(SIGNAL_KEY) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.replace('%', "").trim().parse::<f64>().ok(),
            _ => None,
        };

        parsed
            .filter(|p| p.is_finite())
            .unwrap_or(DEFAULT_SIGNAL_PERCENT)
    }

    fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<Map<String, Value>> for NetworkRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// SECURITY CLASS
// ============================================================================

/// Coarse security class of the connected network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityClass {
    /// WPA / WPA2 / WPA3 handshake
    Secure,
    /// Open network with a recognisable public-venue name
    PublicOpen,
    /// Open network with no other cue
    Open,
}

impl SecurityClass {
    pub fn classify(record: &NetworkRecord) -> Self {
        let auth = record.authentication().to_lowercase();
        if contains_any(&auth, SECURE_AUTH_KEYWORDS) {
            return SecurityClass::Secure;
        }

        let ssid = record.ssid().to_lowercase();
        if contains_any(&ssid, PUBLIC_SSID_KEYWORDS) {
            SecurityClass::PublicOpen
        } else {
            SecurityClass::Open
        }
    }
}

// ============================================================================
// SYNTHETIC PROFILE
// ============================================================================

/// Sub-features injected per security class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalProfile {
    pub rssi_variance: f64,
    pub probe_rate: f64,
    pub oui_trust_score: f64,
    pub anomaly_flag: bool,
}

impl SignalProfile {
    pub fn for_class(class: SecurityClass) -> Self {
        match class {
            SecurityClass::Secure => Self {
                rssi_variance: 1.5,
                probe_rate: 10.0,
                oui_trust_score: 9.0,
                anomaly_flag: false,
            },
            SecurityClass::PublicOpen => Self {
                rssi_variance: 5.0,
                probe_rate: 30.0,
                oui_trust_score: 7.0,
                anomaly_flag: false,
            },
            SecurityClass::Open => Self {
                rssi_variance: 25.0,
                probe_rate: 150.0,
                oui_trust_score: 1.0,
                anomaly_flag: true,
            },
        }
    }
}

/// Map signal quality (percent) onto a synthetic mean RSSI in dBm
pub fn rssi_mean_from_percent(signal_percent: f64) -> f64 {
    -100.0 + signal_percent * 0.7
}

/// Build the model input for the connected network
pub fn extract(record: &NetworkRecord) -> (SecurityClass, FeatureVector) {
    let class = SecurityClass::classify(record);
    let profile = SignalProfile::for_class(class);

    let vector = FeatureVectorBuilder::new()
        .rssi_mean(rssi_mean_from_percent(record.signal_percent()))
        .rssi_variance(profile.rssi_variance)
        .probe_rate(profile.probe_rate)
        .oui_trust_score(profile.oui_trust_score)
        .protocol_anomaly_flag(profile.anomaly_flag)
        .build();

    (class, vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ssid: &str, auth: &str, signal: &str) -> NetworkRecord {
        NetworkRecord::new()
            .with(SSID_KEY, ssid)
            .with(AUTHENTICATION_KEY, auth)
            .with(SIGNAL_KEY, signal)
    }

    #[test]
    fn test_signal_percent_parsing() {
        assert_eq!(record("a", "Open", "80%").signal_percent(), 80.0);
        assert_eq!(record("a", "Open", " 55 % ").signal_percent(), 55.0);
        assert_eq!(record("a", "Open", "strong").signal_percent(), 70.0);
        assert_eq!(NetworkRecord::new().signal_percent(), 70.0);
        assert_eq!(NetworkRecord::new().with(SIGNAL_KEY, 42).signal_percent(), 42.0);
    }

    #[test]
    fn test_security_class() {
        assert_eq!(SecurityClass::classify(&record("Home", "WPA2-Personal", "80%")), SecurityClass::Secure);
        assert_eq!(SecurityClass::classify(&record("Home", "wpa3-sae", "80%")), SecurityClass::Secure);
        assert_eq!(SecurityClass::classify(&record("Hotel Lobby", "Open", "80%")), SecurityClass::PublicOpen);
        assert_eq!(SecurityClass::classify(&record("xyz123", "Open", "80%")), SecurityClass::Open);
        // WEP is not in the secure keyword set
        assert_eq!(SecurityClass::classify(&record("xyz", "WEP", "80%")), SecurityClass::Open);
    }

    #[test]
    fn test_security_key_fallback() {
        let linux = NetworkRecord::new()
            .with(SSID_KEY, "Office")
            .with(SECURITY_KEY, "WPA2 802.1X");
        assert_eq!(linux.authentication(), "WPA2 802.1X");
        assert_eq!(SecurityClass::classify(&linux), SecurityClass::Secure);

        assert_eq!(NetworkRecord::new().authentication(), "N/A");
    }

    #[test]
    fn test_extract_secure_profile() {
        let (class, vector) = extract(&record("Home", "WPA2-Personal", "80%"));
        assert_eq!(class, SecurityClass::Secure);
        assert_eq!(vector.as_array(), &[-44.0, 1.5, 10.0, 9.0, 0.0]);
    }

    #[test]
    fn test_extract_open_profile() {
        let (class, vector) = extract(&record("xyz123", "Open", "90%"));
        assert_eq!(class, SecurityClass::Open);
        assert!((vector.as_array()[0] - -37.0).abs() < 1e-9);
        assert_eq!(&vector.as_array()[1..], &[25.0, 150.0, 1.0, 1.0]);
    }
}
