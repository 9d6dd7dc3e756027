//! Neural network modules for per-point feature extraction.
//!
//! This module provides:
//! - Encoders: point clouds to low- and high-level per-point feature maps
//! - Self-attention and the per-point projector refining high-level features
//! - Feature fusion combining all branches into one feature map

pub mod attention;
pub mod base_learner;
pub mod encoder;
pub mod fusion;

pub use attention::SelfAttention;
pub use base_learner::BaseLearner;
pub use encoder::{Dgcnn, EdgeConvBlock, FeatureEncoder};
pub use fusion::{FeatureFusion, HighLevelMapper};
