//! Configuration types for neural_ccbr.
//!
//! This module provides Burn-style configuration structs for the encoder,
//! feature fusion, bias correction and the full prototype network.

mod model;
mod network;

pub use model::ProtoNetConfig;
pub use network::{
    BaseLearnerConfig, BiasCorrectionConfig, DgcnnConfig, FeatureFusionConfig, SelfAttentionConfig,
};
