//! Prototype learning core.
//!
//! The per-episode pipeline on fused features is:
//! bias correction → masked pooling → prototype aggregation → similarity
//! scoring → cross-entropy.

pub mod bias;
pub mod loss;
pub mod masked;
pub mod prototype;
pub mod similarity;

pub use bias::CrossSetBiasCorrection;
pub use loss::cross_entropy_loss;
pub use masked::{foreground_background, masked_average_pool, MASK_EPS};
pub use prototype::Prototypes;
pub use similarity::PrototypeClassifier;
