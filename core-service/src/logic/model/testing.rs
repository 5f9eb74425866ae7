//! Hand-built artifacts for tests.
//!
//! The "benign" model is centred on secure home-network features:
//! identity reduction and a single support vector at the origin of the
//! standardized space.

use super::artifacts::{
    BoundaryFile, ModelArtifacts, OneClassBoundary, Pca, PcaFile, ScalerFile, StandardScaler,
};
use super::inference::FeaturePipeline;
use super::threshold::ThreatThreshold;
use crate::logic::features::layout::FEATURE_COUNT;

pub const BENIGN_MEAN: [f64; FEATURE_COUNT] = [-65.0, 1.55, 8.0, 9.0, 0.0];
pub const BENIGN_SCALE: [f64; FEATURE_COUNT] = [5.0, 0.85, 3.7, 0.8, 1.0];

pub fn scaler_file() -> ScalerFile {
    ScalerFile {
        mean: BENIGN_MEAN.to_vec(),
        scale: BENIGN_SCALE.to_vec(),
        feature_version: None,
        layout_hash: None,
    }
}

pub fn pca_file() -> PcaFile {
    PcaFile {
        mean: vec![0.0; FEATURE_COUNT],
        components: (0..FEATURE_COUNT)
            .map(|i| (0..FEATURE_COUNT).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect(),
        whiten: false,
        explained_variance: vec![],
    }
}

pub fn boundary_file(intercept: f64) -> BoundaryFile {
    BoundaryFile {
        support_vectors: vec![vec![0.0; FEATURE_COUNT]],
        dual_coef: vec![1.0],
        intercept,
        gamma: 0.02,
    }
}

pub fn artifacts_with_intercept(intercept: f64) -> ModelArtifacts {
    ModelArtifacts::new(
        StandardScaler::from_file(scaler_file()).unwrap(),
        Pca::from_file(pca_file()).unwrap(),
        OneClassBoundary::from_file(boundary_file(intercept)).unwrap(),
    )
    .unwrap()
}

/// Approximate scores (threshold -0.01):
///
/// | profile                          | score |
/// |----------------------------------|-------|
/// | secure, 80% signal               | +0.45 |
/// | public open, 50% signal          | +0.06 |
/// | public open, 80% signal          | -0.03 |
/// | open without keyword, any signal | -0.25 |
pub fn benign_pipeline() -> FeaturePipeline {
    FeaturePipeline::from_artifacts(artifacts_with_intercept(-0.25), ThreatThreshold::default(), "test")
}

/// Every input lands far outside the boundary
pub fn always_threat_pipeline() -> FeaturePipeline {
    FeaturePipeline::from_artifacts(artifacts_with_intercept(-5.0), ThreatThreshold::default(), "test")
}

/// Write the benign artifacts into `dir` as JSON files
pub fn write_benign_artifacts(dir: &std::path::Path) {
    use crate::constants::{MODEL_FILE, PCA_FILE, SCALER_FILE};

    std::fs::write(dir.join(SCALER_FILE), serde_json::to_vec(&scaler_file()).unwrap()).unwrap();
    std::fs::write(dir.join(PCA_FILE), serde_json::to_vec(&pca_file()).unwrap()).unwrap();
    std::fs::write(dir.join(MODEL_FILE), serde_json::to_vec(&boundary_file(-0.25)).unwrap()).unwrap();
}
