//! EdgeConv encoder (dynamic graph CNN).

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig, Conv2d, Conv2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, LeakyRelu, LeakyReluConfig};
use burn::prelude::*;

use super::FeatureEncoder;
use crate::config::DgcnnConfig;

/// Indices of the `k` nearest neighbours of every point in feature space.
///
/// Input: `[batch, channels, n_points]`
/// Output: `[batch, n_points, k]`, each point is its own first neighbour.
/// `k` is capped at `n_points`.
pub fn knn<B: Backend>(x: Tensor<B, 3>, k: usize) -> Tensor<B, 3, Int> {
    let [_, _, n_points] = x.dims();
    let k = k.min(n_points);

    // -||xi - xj||^2 = 2 xi.xj - ||xi||^2 - ||xj||^2
    let inner = x.clone().swap_dims(1, 2).matmul(x.clone()).mul_scalar(2.0);
    let sq = (x.clone() * x).sum_dim(1);
    let neg_dist = inner - sq.clone() - sq.swap_dims(1, 2);

    let (_, indices) = neg_dist.topk_with_indices(k, 2);
    indices
}

/// Edge features `(neighbour - centre, centre)` for every point and neighbour.
///
/// Input: `x` `[batch, channels, n_points]`, `idx` `[batch, n_points, k]`
/// Output: `[batch, 2 * channels, n_points, k]`
pub fn edge_features<B: Backend>(x: Tensor<B, 3>, idx: Tensor<B, 3, Int>) -> Tensor<B, 4> {
    let [batch, channels, n_points] = x.dims();
    let [_, _, k] = idx.dims();

    let points = x.swap_dims(1, 2);
    let flat_idx = idx
        .reshape([batch, n_points * k])
        .unsqueeze_dim::<3>(2)
        .repeat_dim(2, channels);
    let neighbours: Tensor<B, 4> = points
        .clone()
        .gather(1, flat_idx)
        .reshape([batch, n_points, k, channels]);
    let centre: Tensor<B, 4> = points.unsqueeze_dim::<4>(2).repeat_dim(2, k);

    Tensor::cat(vec![neighbours - centre.clone(), centre], 3).permute([0, 3, 1, 2])
}

/// One EdgeConv block: 1x1 Conv2d + BatchNorm + LeakyReLU per layer over edge
/// features, then max over neighbours.
#[derive(Module, Debug)]
pub struct EdgeConvBlock<B: Backend> {
    convs: Vec<Conv2d<B>>,
    norms: Vec<BatchNorm<B, 2>>,
    activation: LeakyRelu,
    #[module(skip)]
    k: usize,
}

impl<B: Backend> EdgeConvBlock<B> {
    /// Create a block mapping `in_channels` point features through `widths`.
    pub fn new(
        in_channels: usize,
        widths: &[usize],
        k: usize,
        negative_slope: f64,
        device: &B::Device,
    ) -> Self {
        let mut convs = Vec::with_capacity(widths.len());
        let mut norms = Vec::with_capacity(widths.len());
        let mut in_dim = in_channels * 2;

        for &out_dim in widths {
            convs.push(
                Conv2dConfig::new([in_dim, out_dim], [1, 1])
                    .with_bias(false)
                    .init(device),
            );
            norms.push(BatchNormConfig::new(out_dim).init(device));
            in_dim = out_dim;
        }

        Self {
            convs,
            norms,
            activation: LeakyReluConfig::new()
                .with_negative_slope(negative_slope)
                .init(),
            k,
        }
    }

    /// Forward pass.
    ///
    /// Input: `[batch, in_channels, n_points]`
    /// Output: `[batch, widths.last(), n_points]`
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let idx = knn(x.clone(), self.k);
        let mut h = edge_features(x, idx);

        for (conv, norm) in self.convs.iter().zip(&self.norms) {
            h = conv.forward(h);
            h = norm.forward(h);
            h = self.activation.forward(h);
        }

        h.max_dim(3).squeeze::<3>(3)
    }
}

/// DGCNN-style encoder.
///
/// A stack of EdgeConv blocks whose outputs are concatenated and refined by a
/// point-wise Conv1d MLP. The first block's output is the low-level map, the
/// MLP output is the high-level map.
#[derive(Module, Debug)]
pub struct Dgcnn<B: Backend> {
    blocks: Vec<EdgeConvBlock<B>>,
    mlp: Vec<Conv1d<B>>,
    mlp_norms: Vec<BatchNorm<B, 1>>,
    activation: LeakyRelu,
    #[module(skip)]
    low_level_dim: usize,
    #[module(skip)]
    high_level_dim: usize,
}

impl<B: Backend> Dgcnn<B> {
    /// Create a new encoder from configuration.
    pub fn new(config: &DgcnnConfig, device: &B::Device) -> Self {
        let mut blocks = Vec::with_capacity(config.edgeconv_widths.len());
        let mut in_dim = config.in_channels;

        for widths in &config.edgeconv_widths {
            blocks.push(EdgeConvBlock::new(
                in_dim,
                widths,
                config.k,
                config.negative_slope,
                device,
            ));
            in_dim = widths.last().copied().unwrap_or(in_dim);
        }

        let mut mlp = Vec::with_capacity(config.mlp_widths.len());
        let mut mlp_norms = Vec::with_capacity(config.mlp_widths.len());
        let mut in_dim = config.edgeconv_output_dim();
        for &out_dim in &config.mlp_widths {
            mlp.push(Conv1dConfig::new(in_dim, out_dim, 1).with_bias(false).init(device));
            mlp_norms.push(BatchNormConfig::new(out_dim).init(device));
            in_dim = out_dim;
        }

        Self {
            blocks,
            mlp,
            mlp_norms,
            activation: LeakyReluConfig::new()
                .with_negative_slope(config.negative_slope)
                .init(),
            low_level_dim: config.low_level_dim(),
            high_level_dim: config.high_level_dim(),
        }
    }

    /// Forward pass returning `(low, high)` feature maps.
    pub fn forward(&self, points: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        let mut outputs = Vec::with_capacity(self.blocks.len());
        let mut x = points;

        for block in &self.blocks {
            x = block.forward(x);
            outputs.push(x.clone());
        }

        let low = outputs[0].clone();
        let mut high = Tensor::cat(outputs, 1);
        for (conv, norm) in self.mlp.iter().zip(&self.mlp_norms) {
            high = conv.forward(high);
            high = norm.forward(high);
            high = self.activation.forward(high);
        }

        (low, high)
    }
}

impl<B: Backend> FeatureEncoder<B> for Dgcnn<B> {
    fn encode(&self, points: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        self.forward(points)
    }

    fn low_level_dim(&self) -> usize {
        self.low_level_dim
    }

    fn high_level_dim(&self) -> usize {
        self.high_level_dim
    }
}
