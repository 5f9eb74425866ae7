//! Model Artifacts
//!
//! Typed form of the three stages fitted offline:
//! standardizer → linear reducer → RBF one-class boundary.
//!
//! Files are JSON. Every artifact is validated at load so that scoring
//! never has to deal with shape errors it could have caught up front.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{MODEL_FILE, PCA_FILE, SCALER_FILE};
use crate::logic::features::layout::{validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};

// ============================================================================
// ERRORS
// ============================================================================

/// Startup failure of the statistical pipeline
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {artifact}: {reason}")]
    Invalid { artifact: &'static str, reason: String },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),
}

fn invalid(artifact: &'static str, reason: impl Into<String>) -> ModelError {
    ModelError::Invalid { artifact, reason: reason.into() }
}

fn all_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}

// ============================================================================
// FILE FORMATS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaFile {
    pub mean: Vec<f64>,
    /// One row per retained component, `FEATURE_COUNT` columns each
    pub components: Vec<Vec<f64>>,
    #[serde(default)]
    pub whiten: bool,
    #[serde(default)]
    pub explained_variance: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryFile {
    pub support_vectors: Vec<Vec<f64>>,
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
    pub gamma: f64,
}

// ============================================================================
// STAGE 1: STANDARDIZER
// ============================================================================

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn from_file(file: ScalerFile) -> Result<Self, ModelError> {
        const NAME: &str = "scaler";

        if let Some(hash) = file.layout_hash {
            validate_layout(file.feature_version.unwrap_or(FEATURE_VERSION), hash)?;
        }
        if file.mean.len() != FEATURE_COUNT || file.scale.len() != FEATURE_COUNT {
            return Err(invalid(NAME, format!(
                "expected {} features, got mean={} scale={}",
                FEATURE_COUNT, file.mean.len(), file.scale.len()
            )));
        }
        if !all_finite(&file.mean) || !all_finite(&file.scale) {
            return Err(invalid(NAME, "non-finite parameter"));
        }
        if file.scale.iter().any(|s| *s <= 0.0) {
            return Err(invalid(NAME, "scale must be positive"));
        }

        Ok(Self {
            mean: Array1::from(file.mean),
            scale: Array1::from(file.scale),
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: ArrayView1<f64>) -> Array1<f64> {
        (&x - &self.mean) / &self.scale
    }
}

// ============================================================================
// STAGE 2: LINEAR REDUCER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Pca {
    mean: Array1<f64>,
    /// (n_components, n_features)
    components: Array2<f64>,
    /// sqrt(explained_variance) when whitening, else None
    whiten_scale: Option<Array1<f64>>,
}

impl Pca {
    pub fn from_file(file: PcaFile) -> Result<Self, ModelError> {
        const NAME: &str = "pca";

        if file.mean.len() != FEATURE_COUNT {
            return Err(invalid(NAME, format!("mean has {} values, expected {}", file.mean.len(), FEATURE_COUNT)));
        }
        let n_components = file.components.len();
        if n_components == 0 || n_components > FEATURE_COUNT {
            return Err(invalid(NAME, format!("{} components is out of range", n_components)));
        }
        if file.components.iter().any(|row| row.len() != FEATURE_COUNT) {
            return Err(invalid(NAME, "every component must have one weight per feature"));
        }
        if !all_finite(&file.mean) || !all_finite(file.components.iter().flatten()) {
            return Err(invalid(NAME, "non-finite parameter"));
        }

        let whiten_scale = if file.whiten {
            if file.explained_variance.len() != n_components
                || file.explained_variance.iter().any(|v| !v.is_finite() || *v <= 0.0)
            {
                return Err(invalid(NAME, "whitening needs a positive variance per component"));
            }
            Some(Array1::from(file.explained_variance).mapv(f64::sqrt))
        } else {
            None
        };

        let flat: Vec<f64> = file.components.into_iter().flatten().collect();
        let components = Array2::from_shape_vec((n_components, FEATURE_COUNT), flat)
            .map_err(|e| invalid(NAME, e.to_string()))?;

        Ok(Self {
            mean: Array1::from(file.mean),
            components,
            whiten_scale,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.components.ncols()
    }

    pub fn transform(&self, z: ArrayView1<f64>) -> Array1<f64> {
        let projected = self.components.dot(&(&z - &self.mean));
        match &self.whiten_scale {
            Some(scale) => projected / scale,
            None => projected,
        }
    }
}

// ============================================================================
// STAGE 3: ONE-CLASS BOUNDARY (RBF kernel)
// ============================================================================

#[derive(Debug, Clone)]
pub struct OneClassBoundary {
    /// (n_support, n_components)
    support_vectors: Array2<f64>,
    dual_coef: Array1<f64>,
    intercept: f64,
    gamma: f64,
}

impl OneClassBoundary {
    pub fn from_file(file: BoundaryFile) -> Result<Self, ModelError> {
        const NAME: &str = "boundary model";

        let n_support = file.support_vectors.len();
        if n_support == 0 {
            return Err(invalid(NAME, "no support vectors"));
        }
        if file.dual_coef.len() != n_support {
            return Err(invalid(NAME, format!(
                "{} dual coefficients for {} support vectors", file.dual_coef.len(), n_support
            )));
        }
        let dim = file.support_vectors[0].len();
        if dim == 0 || file.support_vectors.iter().any(|sv| sv.len() != dim) {
            return Err(invalid(NAME, "support vectors must share one non-zero dimension"));
        }
        if !file.gamma.is_finite() || file.gamma <= 0.0 {
            return Err(invalid(NAME, "gamma must be positive"));
        }
        if !file.intercept.is_finite()
            || !all_finite(&file.dual_coef)
            || !all_finite(file.support_vectors.iter().flatten())
        {
            return Err(invalid(NAME, "non-finite parameter"));
        }

        let flat: Vec<f64> = file.support_vectors.into_iter().flatten().collect();
        let support_vectors = Array2::from_shape_vec((n_support, dim), flat)
            .map_err(|e| invalid(NAME, e.to_string()))?;

        Ok(Self {
            support_vectors,
            dual_coef: Array1::from(file.dual_coef),
            intercept: file.intercept,
            gamma: file.gamma,
        })
    }

    pub fn dimension(&self) -> usize {
        self.support_vectors.ncols()
    }

    pub fn n_support(&self) -> usize {
        self.support_vectors.nrows()
    }

    /// Signed distance to the boundary. Negative means outside (anomalous).
    pub fn decision(&self, y: ArrayView1<f64>) -> f64 {
        let kernel_sum: f64 = self
            .support_vectors
            .rows()
            .into_iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, coef)| {
                let diff = &sv - &y;
                coef * (-self.gamma * diff.dot(&diff)).exp()
            })
            .sum();

        kernel_sum + self.intercept
    }
}

// ============================================================================
// ARTIFACT SET
// ============================================================================

/// SHA-256 of each artifact file, for logs and health reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactFingerprints {
    pub scaler: String,
    pub pca: String,
    pub model: String,
}

/// The three stages, validated against each other
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub scaler: StandardScaler,
    pub pca: Pca,
    pub boundary: OneClassBoundary,
    pub fingerprints: ArtifactFingerprints,
}

impl ModelArtifacts {
    /// Assemble and cross-check the stages
    pub fn new(
        scaler: StandardScaler,
        pca: Pca,
        boundary: OneClassBoundary,
    ) -> Result<Self, ModelError> {
        if pca.n_features() != scaler.n_features() {
            return Err(invalid("pca", format!(
                "expects {} inputs, scaler produces {}", pca.n_features(), scaler.n_features()
            )));
        }
        if boundary.dimension() != pca.n_components() {
            return Err(invalid("boundary model", format!(
                "support vectors have {} dimensions, pca produces {}",
                boundary.dimension(), pca.n_components()
            )));
        }

        Ok(Self {
            scaler,
            pca,
            boundary,
            fingerprints: ArtifactFingerprints::default(),
        })
    }

    /// Load `whispr_scaler.json`, `whispr_pca.json` and `whispr_model.json`
    pub fn load_dir(dir: &Path) -> Result<Self, ModelError> {
        let (scaler_file, scaler_sha) = read_artifact::<ScalerFile>(&dir.join(SCALER_FILE))?;
        let (pca_file, pca_sha) = read_artifact::<PcaFile>(&dir.join(PCA_FILE))?;
        let (model_file, model_sha) = read_artifact::<BoundaryFile>(&dir.join(MODEL_FILE))?;

        let mut artifacts = Self::new(
            StandardScaler::from_file(scaler_file)?,
            Pca::from_file(pca_file)?,
            OneClassBoundary::from_file(model_file)?,
        )?;
        artifacts.fingerprints = ArtifactFingerprints {
            scaler: scaler_sha,
            pca: pca_sha,
            model: model_sha,
        };

        Ok(artifacts)
    }
}

/// Read one artifact and hash its bytes
fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<(T, String), ModelError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ModelError::Missing { path: path.to_path_buf() }
        } else {
            ModelError::Io { path: path.to_path_buf(), source }
        }
    })?;

    let parsed = serde_json::from_slice(&bytes)
        .map_err(|source| ModelError::Parse { path: path.to_path_buf(), source })?;

    Ok((parsed, hex::encode(Sha256::digest(&bytes))))
}
