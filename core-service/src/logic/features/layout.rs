//! Feature Layout
//!
//! Order of the Wi-Fi feature vector. The persisted scaler, PCA and
//! boundary were fitted against exactly this order, so any change here
//! (new feature, removed feature, reordering) must bump `FEATURE_VERSION`
//! and requires refitting the artifacts.
//!
//! Artifacts may carry a `LayoutStamp`; a stamp that differs from the
//! compiled-in one is rejected at load.

use serde::{Deserialize, Serialize};

/// Bump on any change to `Feature` or its order
pub const FEATURE_VERSION: u8 = 1;

pub const FEATURE_COUNT: usize = 5;

/// One model input, declared in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Synthetic mean RSSI derived from signal quality (dBm)
    RssiMean,
    RssiVariance,
    /// Probe / beacon rate
    ProbeRate,
    /// Trust in the access point's vendor prefix
    OuiTrustScore,
    /// 1.0 when the network looks abnormal, else 0.0
    ProtocolAnomalyFlag,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::RssiMean,
        Feature::RssiVariance,
        Feature::ProbeRate,
        Feature::OuiTrustScore,
        Feature::ProtocolAnomalyFlag,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::RssiMean => "rssi_mean",
            Feature::RssiVariance => "rssi_variance",
            Feature::ProbeRate => "probe_rate",
            Feature::OuiTrustScore => "oui_trust_score",
            Feature::ProtocolAnomalyFlag => "protocol_anomaly_flag",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// CRC32 over the version byte and the NUL-terminated feature names
pub fn layout_hash() -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for feature in Feature::ALL {
        hasher.update(feature.name().as_bytes());
        hasher.update(b"\0");
    }
    hasher.finalize()
}

// ============================================================================
// LAYOUT STAMP
// ============================================================================

/// Version + hash pair recorded alongside fitted artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStamp {
    pub feature_version: u8,
    pub layout_hash: u32,
}

impl LayoutStamp {
    pub fn current() -> Self {
        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
        }
    }
}

impl std::fmt::Display for LayoutStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{} (hash {:08x})", self.feature_version, self.layout_hash)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("feature layout mismatch: artifacts fitted on {found}, engine expects {expected}")]
pub struct LayoutMismatchError {
    pub expected: LayoutStamp,
    pub found: LayoutStamp,
}

pub fn validate_layout(feature_version: u8, layout_hash: u32) -> Result<(), LayoutMismatchError> {
    let found = LayoutStamp { feature_version, layout_hash };
    let expected = LayoutStamp::current();

    if found == expected {
        Ok(())
    } else {
        Err(LayoutMismatchError { expected, found })
    }
}
