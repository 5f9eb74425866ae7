//! Wi-Fi Threat Resolver
//!
//! Heuristic tier from the connected network's security, statistical
//! verdict from the feature pipeline, then reconciliation:
//! a THREAT verdict always escalates to CRITICAL.

use crate::logic::features::network::{self, NetworkRecord, SecurityClass};
use crate::logic::features::vector::FeatureVector;
use crate::logic::model::FeaturePipeline;

use super::rules::NO_NETWORK_SSID;
use super::types::{RiskLevel, ThreatTier, WifiReport};

/// Tier assigned before the model is consulted
pub fn heuristic_tier(class: SecurityClass) -> ThreatTier {
    match class {
        SecurityClass::Secure => ThreatTier::Low,
        SecurityClass::PublicOpen => ThreatTier::Mild,
        SecurityClass::Open => ThreatTier::High,
    }
}

/// Combine heuristic and statistical outcomes
pub fn reconcile(heuristic: ThreatTier, risk_level: RiskLevel) -> ThreatTier {
    if risk_level == RiskLevel::Threat {
        ThreatTier::Critical
    } else {
        heuristic
    }
}

/// Terminal report when the snapshot lists no networks
pub fn no_networks_report() -> WifiReport {
    WifiReport {
        risk_level: RiskLevel::NoNetworksFound,
        anomaly_score: 0.0,
        feature_vector: FeatureVector::sentinel(),
        ssid: NO_NETWORK_SSID.to_string(),
        observed_networks: Vec::new(),
        threat_tier: ThreatTier::Low,
    }
}

#[derive(Debug, Clone)]
pub struct WifiThreatResolver {
    pipeline: FeaturePipeline,
}

impl WifiThreatResolver {
    pub fn new(pipeline: FeaturePipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Assess the snapshot. The connected network must be listed first.
    pub fn resolve(&self, networks: &[NetworkRecord]) -> WifiReport {
        let Some(connected) = networks.first() else {
            return no_networks_report();
        };

        let ssid = connected.ssid();
        let (class, vector) = network::extract(connected);
        let heuristic = heuristic_tier(class);

        let signal = self.pipeline.score(&vector);
        let threat_tier = reconcile(heuristic, signal.risk_level);

        log::info!(
            "Wi-Fi processed -> network: {}, AI result: {}, threat tier: {}",
            ssid,
            signal.risk_level,
            threat_tier
        );
        log::debug!("Wi-Fi features: {}", vector.to_log_entry());

        WifiReport {
            risk_level: signal.risk_level,
            anomaly_score: signal.anomaly_score,
            feature_vector: vector,
            ssid,
            observed_networks: networks.to_vec(),
            threat_tier,
        }
    }
}
