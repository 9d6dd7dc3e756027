//! Per-point projector built from 1x1 convolutions.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Relu};
use burn::prelude::*;

use crate::config::BaseLearnerConfig;

impl BaseLearnerConfig {
    /// Initialize the projector.
    pub fn init<B: Backend>(&self, device: &B::Device) -> BaseLearner<B> {
        let mut convs = Vec::with_capacity(self.widths.len());
        let mut norms = Vec::with_capacity(self.widths.len());
        let mut in_dim = self.in_channels;

        for &out_dim in &self.widths {
            convs.push(Conv1dConfig::new(in_dim, out_dim, 1).init(device));
            norms.push(BatchNormConfig::new(out_dim).init(device));
            in_dim = out_dim;
        }

        BaseLearner {
            convs,
            norms,
            activation: Relu::new(),
        }
    }
}

/// Conv1d + BatchNorm per layer, ReLU between layers but not after the last.
#[derive(Module, Debug)]
pub struct BaseLearner<B: Backend> {
    convs: Vec<Conv1d<B>>,
    norms: Vec<BatchNorm<B, 1>>,
    activation: Relu,
}

impl<B: Backend> BaseLearner<B> {
    /// Forward pass.
    ///
    /// Input: `[batch, in_channels, n_points]`
    /// Output: `[batch, widths.last(), n_points]`
    pub fn forward(&self, mut x: Tensor<B, 3>) -> Tensor<B, 3> {
        let last = self.convs.len().saturating_sub(1);

        for (i, (conv, norm)) in self.convs.iter().zip(&self.norms).enumerate() {
            x = norm.forward(conv.forward(x));
            if i != last {
                x = self.activation.forward(x);
            }
        }

        x
    }

    /// Output width.
    pub fn output_dim(&self) -> usize {
        self.convs
            .last()
            .map(|conv| conv.weight.dims()[0])
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_base_learner_forward() {
        let device = Default::default();
        let learner = BaseLearnerConfig::new(256).init::<TestBackend>(&device);

        let x = Tensor::zeros([3, 256, 7], &device);
        assert_eq!(learner.forward(x).dims(), [3, 64, 7]);
        assert_eq!(learner.output_dim(), 64);
    }

    #[test]
    fn test_last_layer_is_not_rectified() {
        let device = Default::default();
        let learner = BaseLearnerConfig::new(4)
            .with_widths(vec![8, 8, 2])
            .init::<TestBackend>(&device);

        // Some outputs must be negative when no ReLU follows the last layer.
        let x = Tensor::random([4, 4, 32], burn::tensor::Distribution::Normal(0.0, 1.0), &device);
        let min: f32 = learner.forward(x).min().into_scalar();
        assert!(min < 0.0);
    }
}
