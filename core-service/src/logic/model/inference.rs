//! Inference Engine - Feature Pipeline
//!
//! standardize → reduce → signed distance to the one-class boundary.
//!
//! Scoring never fails from the caller's point of view: a pipeline whose
//! artifacts did not load, or a runtime failure inside a stage, yields
//! `PROCESSING_ERROR` with a sentinel score.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::artifacts::{ArtifactFingerprints, ModelArtifacts, ModelError};
use super::threshold::ThreatThreshold;
use crate::constants::PROCESSING_ERROR_SCORE;
use crate::logic::features::vector::FeatureVector;
use crate::logic::threat::types::{RiskLevel, ScoredSignal};

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Failure inside a pipeline stage. Never leaves this module.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("pipeline unavailable: model artifacts not loaded")]
    Unavailable,

    #[error("{stage} expected {expected} values, got {actual}")]
    DimensionMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{stage} produced a non-finite value")]
    NonFinite { stage: &'static str },
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Metadata about the loaded artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub source: String,
    pub reduced_dimensions: usize,
    pub support_vectors: usize,
    pub fingerprints: ArtifactFingerprints,
    pub loaded_at: DateTime<Utc>,
}

/// Engine status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub threat_threshold: f64,
    pub metadata: Option<ModelMetadata>,
    pub inference_count: u64,
    pub error_count: u64,
    pub avg_latency_us: f64,
}

#[derive(Debug, Default)]
struct InferenceStats {
    latency_sum_us: AtomicU64,
    count: AtomicU64,
    errors: AtomicU64,
}

// ============================================================================
// FEATURE PIPELINE
// ============================================================================

/// Immutable scoring pipeline. Cheap to clone; clones share artifacts
/// and counters.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    artifacts: Option<Arc<ModelArtifacts>>,
    metadata: Option<ModelMetadata>,
    threshold: ThreatThreshold,
    stats: Arc<InferenceStats>,
}

impl FeaturePipeline {
    /// Build from already validated artifacts
    pub fn from_artifacts(artifacts: ModelArtifacts, threshold: ThreatThreshold, source: &str) -> Self {
        let metadata = ModelMetadata {
            source: source.to_string(),
            reduced_dimensions: artifacts.pca.n_components(),
            support_vectors: artifacts.boundary.n_support(),
            fingerprints: artifacts.fingerprints.clone(),
            loaded_at: Utc::now(),
        };

        Self {
            artifacts: Some(Arc::new(artifacts)),
            metadata: Some(metadata),
            threshold,
            stats: Arc::default(),
        }
    }

    /// Load the three artifacts from `dir`
    pub fn load(dir: &Path, threshold: ThreatThreshold) -> Result<Self, ModelError> {
        log::info!("Loading model artifacts from: {}", dir.display());

        let artifacts = ModelArtifacts::load_dir(dir)?;

        log::info!(
            "Model artifacts loaded: {} components, {} support vectors, threshold {}",
            artifacts.pca.n_components(),
            artifacts.boundary.n_support(),
            threshold.get()
        );
        log::debug!(
            "Artifact sha256: scaler={} pca={} model={}",
            artifacts.fingerprints.scaler,
            artifacts.fingerprints.pca,
            artifacts.fingerprints.model
        );

        Ok(Self::from_artifacts(artifacts, threshold, &dir.display().to_string()))
    }

    /// A pipeline whose every score is `PROCESSING_ERROR`
    pub fn unavailable(threshold: ThreatThreshold) -> Self {
        Self {
            artifacts: None,
            metadata: None,
            threshold,
            stats: Arc::default(),
        }
    }

    /// Load, or degrade to `unavailable` and log why
    pub fn load_or_degraded(dir: &Path, threshold: ThreatThreshold) -> Self {
        match Self::load(dir, threshold) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                log::error!("Model unavailable ({}) - every assessment will report PROCESSING_ERROR", e);
                Self::unavailable(threshold)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn threshold(&self) -> ThreatThreshold {
        self.threshold
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    /// Score one vector. Never fails; see module docs.
    pub fn score(&self, vector: &FeatureVector) -> ScoredSignal {
        let start_time = std::time::Instant::now();

        let signal = match self.anomaly_score(vector) {
            Ok(anomaly_score) => ScoredSignal {
                feature_vector: *vector,
                anomaly_score,
                risk_level: if self.threshold.is_threat(anomaly_score) {
                    RiskLevel::Threat
                } else {
                    RiskLevel::Benign
                },
            },
            Err(ScoringError::Unavailable) => processing_error(vector),
            Err(e) => {
                log::error!("Prediction processing error: {}", e);
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                processing_error(vector)
            }
        };

        self.stats
            .latency_sum_us
            .fetch_add(start_time.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.stats.count.fetch_add(1, Ordering::Relaxed);

        signal
    }

    /// Raw signed distance to the boundary
    pub fn anomaly_score(&self, vector: &FeatureVector) -> Result<f64, ScoringError> {
        let artifacts = self.artifacts.as_ref().ok_or(ScoringError::Unavailable)?;

        if !vector.is_finite() {
            return Err(ScoringError::NonFinite { stage: "input" });
        }

        let input = ArrayView1::from(vector.as_slice());
        check_len("scaler", artifacts.scaler.n_features(), input.len())?;
        let scaled = artifacts.scaler.transform(input);
        check_finite("scaler", scaled.iter())?;

        check_len("pca", artifacts.pca.n_features(), scaled.len())?;
        let reduced = artifacts.pca.transform(scaled.view());
        check_finite("pca", reduced.iter())?;

        check_len("boundary model", artifacts.boundary.dimension(), reduced.len())?;
        let score = artifacts.boundary.decision(reduced.view());
        if !score.is_finite() {
            return Err(ScoringError::NonFinite { stage: "boundary model" });
        }

        Ok(score)
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.stats.latency_sum_us.load(Ordering::Relaxed);
        let count = self.stats.count.load(Ordering::Relaxed);
        let avg = if count > 0 { sum as f64 / count as f64 } else { 0.0 };

        EngineStatus {
            model_loaded: self.is_loaded(),
            threat_threshold: self.threshold.get(),
            metadata: self.metadata.clone(),
            inference_count: count,
            error_count: self.stats.errors.load(Ordering::Relaxed),
            avg_latency_us: avg,
        }
    }
}

fn processing_error(vector: &FeatureVector) -> ScoredSignal {
    ScoredSignal {
        feature_vector: *vector,
        anomaly_score: PROCESSING_ERROR_SCORE,
        risk_level: RiskLevel::ProcessingError,
    }
}

fn check_len(stage: &'static str, expected: usize, actual: usize) -> Result<(), ScoringError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ScoringError::DimensionMismatch { stage, expected, actual })
    }
}

fn check_finite<'a>(stage: &'static str, mut values: impl Iterator<Item = &'a f64>) -> Result<(), ScoringError> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ScoringError::NonFinite { stage })
    }
}
