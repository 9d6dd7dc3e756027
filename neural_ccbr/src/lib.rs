//! # neural_ccbr
//!
//! Few-shot point-cloud semantic segmentation with Burn.
//!
//! A prototype network segments query clouds by comparing every query point
//! to class prototypes averaged from a handful of labelled support clouds.
//! Before prototypes are built, support features are shifted towards the
//! query distribution by a cross-set bias correction.
//!
//! ## Features
//!
//! - **Encoder**: EdgeConv (DGCNN-style) stack behind the [`nn::FeatureEncoder`] trait
//! - **Feature fusion**: low-level map, self-attention or linear map, and a projector
//! - **Bias correction**: channel attention shared by support and query, explicit query grouping
//! - **Prototypes**: masked average pooling, one background and `n_way` foreground prototypes
//! - **Classifier**: cosine or negative squared Euclidean similarity, cross-entropy loss
//!
//! ## Quick Start
//!
//! ```ignore
//! use neural_ccbr::prelude::*;
//! use burn::backend::NdArray;
//!
//! let device = Default::default();
//! let config = ProtoNetConfig::new(2, 1).with_method("cosine".to_string());
//! let model = ProtoNet::<NdArray>::new(&config, &device)?;
//!
//! let episode = Episode::from_raw(config.episode_shape(2), support, masks, query, labels, &device)?;
//! let output = model.forward(&episode)?;
//! println!("loss = {}", output.loss_value());
//! ```
//!
//! ## Feature Flags
//!
//! - `ndarray` (default): CPU backend
//! - `wgpu`: GPU acceleration via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod episode;
pub mod error;
pub mod eval;
pub mod model;
pub mod nn;
pub mod proto;

// Re-export key types for convenience
pub use config::ProtoNetConfig;
pub use episode::Episode;
pub use error::{NeuralCcbrError, Result};
pub use model::{ProtoNet, ProtoNetOutput};

pub use ccbr_core::{EpisodeShape, GroupingScheme, SimilarityMetric};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        BaseLearnerConfig, BiasCorrectionConfig, DgcnnConfig, FeatureFusionConfig,
        ProtoNetConfig, SelfAttentionConfig,
    };
    pub use crate::episode::Episode;
    pub use crate::error::{NeuralCcbrError, Result};
    pub use crate::eval::{evaluate, EpisodeMetrics, MetricsTracker};
    pub use crate::model::{ProtoNet, ProtoNetOutput};
    pub use crate::nn::{Dgcnn, FeatureEncoder, FeatureFusion, SelfAttention};
    pub use crate::proto::{
        cross_entropy_loss, masked_average_pool, CrossSetBiasCorrection, PrototypeClassifier,
        Prototypes,
    };

    pub use ccbr_core::{ConfusionMatrix, EpisodeShape, GroupingScheme, SimilarityMetric};
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn test_public_api() {
        let config = ProtoNetConfig::new(2, 1);
        assert_eq!(config.feat_dim(), 192);
        assert_eq!(config.metric().unwrap(), SimilarityMetric::Euclidean);
    }

    #[test]
    fn test_training_mode_forward_backward() {
        let device = Default::default();
        let config = ProtoNetConfig::new(2, 1)
            .with_pc_in_dim(3)
            .with_pc_npts(5)
            .with_edgeconv_widths(vec![vec![8]])
            .with_dgcnn_mlp_widths(vec![8])
            .with_dgcnn_k(2)
            .with_base_widths(vec![8])
            .with_output_dim(8);
        let model = ProtoNet::<TestBackend>::new(&config, &device).unwrap();

        let shape = config.episode_shape(2);
        let episode = Episode::from_raw(
            shape,
            (0..30).map(|i| (i as f32 * 0.37).sin()).collect(),
            vec![1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0],
            (0..30).map(|i| (i as f32 * 0.11).cos()).collect(),
            vec![1, 1, 0, 0, 0, 2, 2, 0, 0, 2],
            &device,
        )
        .unwrap();

        let output = model.forward(&episode).unwrap();
        assert!(output.loss_value().is_finite());

        let _grads = output.loss.backward();
    }
}
