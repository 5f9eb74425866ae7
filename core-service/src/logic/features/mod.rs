//! Features Module - Feature Extraction
//!
//! Derives the fixed-layout Wi-Fi feature vector from raw network records.
//! The layout is a contract with the persisted model artifacts.

pub mod layout;
pub mod network;
pub mod vector;

// Re-export common types
pub use layout::{Feature, LayoutStamp, FEATURE_COUNT, FEATURE_VERSION};
pub use network::{NetworkRecord, SecurityClass};
pub use vector::{FeatureVector, FeatureVectorBuilder};
