//! Distance Estimator
//!
//! Log-distance path-loss model: `d = 10 ^ ((rssi_1m - rssi) / (10 * n))`.

use serde::{Deserialize, Serialize};

use super::rules::{FLOOR_DISTANCE_M, PATH_LOSS_EXPONENT, RSSI_AT_1M};

/// Calibration for the path-loss model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    /// Expected RSSI (dBm) at one meter
    pub reference_rssi: f64,
    /// Path-loss exponent (2.0 free space, higher indoors)
    pub exponent: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            reference_rssi: RSSI_AT_1M,
            exponent: PATH_LOSS_EXPONENT,
        }
    }
}

impl PathLossModel {
    /// Estimated distance in meters. Total: never negative, never NaN.
    pub fn estimate(&self, rssi: f64) -> f64 {
        // NaN compares false everywhere, route it to the floor as well
        if rssi.is_nan() || rssi >= self.reference_rssi {
            return FLOOR_DISTANCE_M;
        }

        let power = (self.reference_rssi - rssi) / (10.0 * self.exponent);
        10f64.powf(power)
    }
}

/// Estimate with the default calibration
pub fn estimate(rssi: f64) -> f64 {
    PathLossModel::default().estimate(rssi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_at_or_above_reference() {
        assert_eq!(estimate(-59.0), 0.1);
        assert_eq!(estimate(-30.0), 0.1);
        assert_eq!(estimate(10.0), 0.1);
        assert_eq!(estimate(f64::NAN), 0.1);
        assert_eq!(estimate(f64::INFINITY), 0.1);
    }

    #[test]
    fn test_reference_decade() {
        // 28 dB below the reference is exactly ten meters with n = 2.8
        assert!((estimate(-87.0) - 10.0).abs() < 1e-9);
        assert!((estimate(-59.0 - 1e-9) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic_as_rssi_drops() {
        let mut last = estimate(-60.0);
        for rssi in (61..=110).map(|r| -(r as f64)) {
            let d = estimate(rssi);
            assert!(d > last, "distance must grow: {} -> {}", last, d);
            last = d;
        }
    }

    #[test]
    fn test_never_negative() {
        assert!(estimate(f64::NEG_INFINITY) >= 0.0);
        assert!(estimate(-500.0) >= 0.0);
    }

    #[test]
    fn test_custom_calibration() {
        let model = PathLossModel { reference_rssi: -50.0, exponent: 2.0 };
        assert!((model.estimate(-70.0) - 10.0).abs() < 1e-9);
    }
}
