//! Model Module - Statistical scoring
//!
//! Loads the persisted stages once and scores feature vectors.
//! Nothing here mutates after startup.

pub mod artifacts;
pub mod inference;
pub mod threshold;

#[cfg(test)]
pub(crate) mod testing;


pub use artifacts::{ModelArtifacts, ModelError};
pub use inference::{EngineStatus, FeaturePipeline, ModelMetadata, ScoringError};
pub use threshold::ThreatThreshold;
