//! Point-cloud feature encoders.
//!
//! An encoder maps raw point clouds `[batch, in_channels, n_points]` to two
//! per-point feature maps: a low-level (local geometry) map and a high-level
//! (context) map. The rest of the model only depends on [`FeatureEncoder`].

mod dgcnn;

use burn::prelude::*;

pub use dgcnn::{knn, edge_features, Dgcnn, EdgeConvBlock};

/// Capability of turning point clouds into two levels of per-point features.
pub trait FeatureEncoder<B: Backend> {
    /// Encode a batch of point clouds.
    ///
    /// Input: `[batch, in_channels, n_points]`
    /// Output: `([batch, low_level_dim, n_points], [batch, high_level_dim, n_points])`
    fn encode(&self, points: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>);

    /// Width of the low-level map.
    fn low_level_dim(&self) -> usize;

    /// Width of the high-level map.
    fn high_level_dim(&self) -> usize;
}
