//! Fusion of encoder outputs into one per-point feature map.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::prelude::*;

use super::attention::SelfAttention;
use super::base_learner::BaseLearner;
use crate::config::{BaseLearnerConfig, FeatureFusionConfig, SelfAttentionConfig};

/// Map applied to the high-level features before fusion.
#[derive(Module, Debug)]
pub enum HighLevelMapper<B: Backend> {
    /// Point-wise self-attention.
    Attention(SelfAttention<B>),
    /// Bias-free 1x1 convolution.
    Linear(Conv1d<B>),
}

impl<B: Backend> HighLevelMapper<B> {
    /// Input: `[batch, high_dim, n_points]`
    /// Output: `[batch, output_dim, n_points]`
    pub fn forward(&self, high: Tensor<B, 3>) -> Tensor<B, 3> {
        match self {
            HighLevelMapper::Attention(attention) => attention.forward(high),
            HighLevelMapper::Linear(mapper) => mapper.forward(high),
        }
    }
}

/// Concatenates `[low, mapped(high), projected(high)]` along channels.
#[derive(Module, Debug)]
pub struct FeatureFusion<B: Backend> {
    high_mapper: HighLevelMapper<B>,
    base_learner: BaseLearner<B>,
    #[module(skip)]
    feat_dim: usize,
}

impl FeatureFusionConfig {
    /// Initialize the fusion module.
    pub fn init<B: Backend>(&self, device: &B::Device) -> FeatureFusion<B> {
        let mapper = if self.use_attention {
            HighLevelMapper::Attention(
                SelfAttentionConfig::new(self.high_level_dim, self.output_dim)
                    .with_dropout(self.attention_dropout)
                    .init(device),
            )
        } else {
            HighLevelMapper::Linear(
                Conv1dConfig::new(self.high_level_dim, self.output_dim, 1)
                    .with_bias(false)
                    .init(device),
            )
        };

        let base_learner = BaseLearnerConfig::new(self.high_level_dim)
            .with_widths(self.base_widths.clone())
            .init(device);

        FeatureFusion {
            high_mapper: mapper,
            base_learner,
            feat_dim: self.feat_dim(),
        }
    }
}

impl<B: Backend> FeatureFusion<B> {
    /// Fuse encoder outputs.
    ///
    /// Input: low `[batch, low_dim, n_points]`, high `[batch, high_dim, n_points]`
    /// Output: `[batch, feat_dim, n_points]`
    pub fn fuse(&self, low: Tensor<B, 3>, high: Tensor<B, 3>) -> Tensor<B, 3> {
        let projected = self.base_learner.forward(high.clone());
        let mapped = self.high_mapper.forward(high);

        Tensor::cat(vec![low, mapped, projected], 1)
    }

    /// Width of the fused features.
    pub fn feat_dim(&self) -> usize {
        self.feat_dim
    }

    /// Whether the high-level branch uses self-attention.
    pub fn uses_attention(&self) -> bool {
        matches!(self.high_mapper, HighLevelMapper::Attention(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_fuse_with_attention() {
        let device = Default::default();
        let fusion = FeatureFusionConfig::new(16, 32)
            .with_output_dim(8)
            .with_base_widths(vec![12, 4])
            .init::<TestBackend>(&device);

        let low = Tensor::zeros([2, 16, 5], &device);
        let high = Tensor::ones([2, 32, 5], &device);
        let fused = fusion.fuse(low, high);

        assert!(fusion.uses_attention());
        assert_eq!(fusion.feat_dim(), 28);
        assert_eq!(fused.dims(), [2, 28, 5]);
    }

    #[test]
    fn test_fuse_with_linear_mapper() {
        let device = Default::default();
        let fusion = FeatureFusionConfig::new(16, 32)
            .with_use_attention(false)
            .init::<TestBackend>(&device);

        let fused = fusion.fuse(Tensor::zeros([1, 16, 3], &device), Tensor::zeros([1, 32, 3], &device));

        assert!(!fusion.uses_attention());
        assert_eq!(fused.dims(), [1, 16 + 64 + 64, 3]);
    }

    #[test]
    fn test_low_level_map_is_kept_verbatim() {
        let device = Default::default();
        let fusion = FeatureFusionConfig::new(2, 4)
            .with_output_dim(2)
            .with_base_widths(vec![2])
            .init::<TestBackend>(&device);

        let low = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![1.0f32, 2.0, 3.0, 4.0], [1, 2, 2]),
            &device,
        );
        let fused = fusion.fuse(low, Tensor::zeros([1, 4, 2], &device));
        let head: Vec<f32> = fused.narrow(1, 0, 2).to_data().to_vec().unwrap();

        assert_eq!(head, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_mapper_variant_follows_config() {
        let device = Default::default();
        let config = FeatureFusionConfig::new(4, 8)
            .with_output_dim(6)
            .with_base_widths(vec![4]);
        let attention = config.init::<TestBackend>(&device);
        let linear = config.with_use_attention(false).init::<TestBackend>(&device);

        assert!(matches!(attention.high_mapper, HighLevelMapper::Attention(_)));
        assert!(matches!(linear.high_mapper, HighLevelMapper::Linear(_)));

        let mapped = linear.high_mapper.forward(Tensor::ones([1, 8, 3], &device));
        assert_eq!(mapped.dims(), [1, 6, 3]);
    }
}
