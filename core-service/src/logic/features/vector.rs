//! Feature Vector - Core data structure for model input
//!
//! Fixed-length vector whose order is defined by `layout.rs`. Once built
//! the values cannot change; use `FeatureVectorBuilder` to assemble one
//! feature by feature.

use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, Feature, FEATURE_COUNT, FEATURE_VERSION};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Immutable feature vector in `Feature` order.
///
/// Serializes as a plain JSON array of `FEATURE_COUNT` numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

/// Value used for every slot of the "no networks" sentinel vector
pub const SENTINEL_FEATURE_VALUE: f64 = -1.0;

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Vector reported when there is nothing to assess
    pub fn sentinel() -> Self {
        Self::from_values([SENTINEL_FEATURE_VALUE; FEATURE_COUNT])
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// True when every value is a finite number
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Named values for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": FEATURE_VERSION,
            "layout_hash": layout_hash(),
            "values": self.values,
            "named_values": Feature::ALL.iter()
                .zip(self.values.iter())
                .map(|(feature, value)| (feature.name(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for creating FeatureVector with one setter per feature
#[derive(Debug, Default)]
pub struct FeatureVectorBuilder {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rssi_mean(self, value: f64) -> Self {
        self.put(Feature::RssiMean, value)
    }

    pub fn rssi_variance(self, value: f64) -> Self {
        self.put(Feature::RssiVariance, value)
    }

    pub fn probe_rate(self, value: f64) -> Self {
        self.put(Feature::ProbeRate, value)
    }

    pub fn oui_trust_score(self, value: f64) -> Self {
        self.put(Feature::OuiTrustScore, value)
    }

    pub fn protocol_anomaly_flag(self, flagged: bool) -> Self {
        self.put(Feature::ProtocolAnomalyFlag, if flagged { 1.0 } else { 0.0 })
    }

    pub fn put(mut self, feature: Feature, value: f64) -> Self {
        self.values[feature.index()] = value;
        self
    }

    pub fn build(self) -> FeatureVector {
        FeatureVector::from_values(self.values)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_places_values_in_layout_order() {
        let vector = FeatureVectorBuilder::new()
            .rssi_mean(-44.0)
            .rssi_variance(1.5)
            .probe_rate(10.0)
            .oui_trust_score(9.0)
            .protocol_anomaly_flag(false)
            .build();

        assert_eq!(vector.as_array(), &[-44.0, 1.5, 10.0, 9.0, 0.0]);
        assert_eq!(vector.as_array()[Feature::ProbeRate.index()], 10.0);
    }

    #[test]
    fn test_unset_features_are_zero() {
        let vector = FeatureVectorBuilder::new().put(Feature::OuiTrustScore, 3.0).build();
        assert_eq!(vector.as_array(), &[0.0, 0.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_sentinel() {
        let vector = FeatureVector::sentinel();
        assert!(vector.as_slice().iter().all(|v| *v == -1.0));
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let vector = FeatureVector::from_values([-65.0, 5.0, 30.0, 7.0, 0.0]);
        let json = serde_json::to_value(vector).unwrap();
        assert_eq!(json, serde_json::json!([-65.0, 5.0, 30.0, 7.0, 0.0]));

        let back: FeatureVector = serde_json::from_value(json).unwrap();
        assert_eq!(back, vector);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let result: Result<FeatureVector, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(result.is_err());
    }

    #[test]
    fn test_to_log_entry() {
        let log = FeatureVector::sentinel().to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["named_values"]["rssi_mean"], -1.0);
    }
}
