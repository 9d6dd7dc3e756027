//! Point-wise self-attention over a feature map.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{Dropout, DropoutConfig};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::config::SelfAttentionConfig;

/// Scaled dot-product self-attention between the points of one cloud.
///
/// Query, key and value are 1x1 convolutions without bias.
#[derive(Module, Debug)]
pub struct SelfAttention<B: Backend> {
    q_map: Conv1d<B>,
    k_map: Conv1d<B>,
    v_map: Conv1d<B>,
    dropout: Dropout,
    #[module(skip)]
    temperature: f64,
}

impl SelfAttentionConfig {
    /// Initialize the attention module.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SelfAttention<B> {
        let proj = || {
            Conv1dConfig::new(self.in_channels, self.out_channels, 1)
                .with_bias(false)
                .init(device)
        };

        SelfAttention {
            q_map: proj(),
            k_map: proj(),
            v_map: proj(),
            dropout: DropoutConfig::new(self.dropout).init(),
            temperature: (self.out_channels as f64).sqrt(),
        }
    }
}

impl<B: Backend> SelfAttention<B> {
    /// Attention weights between points.
    ///
    /// Input: `[batch, in_channels, n_points]`
    /// Output: `[batch, n_points, n_points]`, rows sum to 1
    pub fn weights(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let q = self.q_map.forward(x.clone()).swap_dims(1, 2);
        let k = self.k_map.forward(x);

        let scores = q.div_scalar(self.temperature).matmul(k);
        softmax(scores, 2)
    }

    /// Forward pass.
    ///
    /// Input: `[batch, in_channels, n_points]`
    /// Output: `[batch, out_channels, n_points]`
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let v = self.v_map.forward(x.clone()).swap_dims(1, 2);
        let attn = self.dropout.forward(self.weights(x));

        attn.matmul(v).swap_dims(1, 2)
    }
}
