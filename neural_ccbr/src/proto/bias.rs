//! Cross-set bias correction.
//!
//! Support and query features of one episode are drawn from different
//! clouds, so their distributions drift apart. This module estimates the
//! per-point discrepancy between each way's support group and the matching
//! query group, weighted by a channel attention shared by both sets, and
//! shifts the support features by it.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::pool::{MaxPool1d, MaxPool1dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use ccbr_core::GroupingScheme;

use crate::config::BiasCorrectionConfig;
use crate::error::{ensure_shape, NeuralCcbrError, Result};

/// Channel attention followed by a support-shifting correction.
#[derive(Module, Debug)]
pub struct CrossSetBiasCorrection<B: Backend> {
    pool: MaxPool1d,
    conv: Conv1d<B>,
    norm: BatchNorm<B, 1>,
    activation: Relu,
    #[module(skip)]
    feat_dim: usize,
}

impl BiasCorrectionConfig {
    /// Initialize the bias correction module.
    pub fn init<B: Backend>(&self, device: &B::Device) -> CrossSetBiasCorrection<B> {
        CrossSetBiasCorrection {
            pool: MaxPool1dConfig::new(self.pool_kernel)
                .with_stride(self.pool_stride)
                .init(),
            conv: Conv1dConfig::new(self.pooled_dim(), self.feat_dim, 1)
                .with_bias(false)
                .init(device),
            norm: BatchNormConfig::new(self.feat_dim).init(device),
            activation: Relu::new(),
            feat_dim: self.feat_dim,
        }
    }
}

impl<B: Backend> CrossSetBiasCorrection<B> {
    /// Channel attention of grouped features.
    ///
    /// Input: `[groups, feat_dim, n_points]`
    /// Output: `[groups, feat_dim, n_points]`, summing to 1 over channels
    pub fn attention(&self, grouped: Tensor<B, 3>) -> Tensor<B, 3> {
        // Pool along channels, one row per point.
        let pooled = self.pool.forward(grouped.swap_dims(1, 2)).swap_dims(1, 2);

        let x = self.conv.forward(pooled);
        let x = self.norm.forward(x);
        let x = self.activation.forward(x);

        softmax(x, 1)
    }

    /// Correct support features against the query set.
    ///
    /// Input: support `[n_way, k_shot, feat_dim, n_points]`, query
    /// `[n_queries, feat_dim, n_points]`, and the grouping of the query batch
    /// (`groups == n_way`, `n_queries == groups * group_size`).
    /// Output: corrected support with the input support's shape.
    pub fn forward(
        &self,
        support: Tensor<B, 4>,
        query: Tensor<B, 3>,
        queries: &GroupingScheme,
    ) -> Result<Tensor<B, 4>> {
        let [n_way, k_shot, feat_dim, n_points] = support.dims();
        let [n_queries, _, _] = query.dims();

        if feat_dim != self.feat_dim {
            return Err(NeuralCcbrError::shape(
                "support features",
                &[n_way, k_shot, self.feat_dim, n_points],
                &[n_way, k_shot, feat_dim, n_points],
            ));
        }
        ensure_shape("query features", [n_queries, feat_dim, n_points], query.dims())?;
        queries.check_batch(n_queries)?;
        if queries.groups != n_way {
            return Err(ccbr_core::CcbrCoreError::GroupingMismatch {
                batch: n_queries,
                groups: n_way,
                group_size: queries.group_size,
            }
            .into());
        }

        let support_groups: Tensor<B, 3> =
            support.clone().mean_dim(1).reshape([n_way, feat_dim, n_points]);
        let query_groups: Tensor<B, 3> = query
            .reshape([n_way, queries.group_size, feat_dim, n_points])
            .mean_dim(1)
            .reshape([n_way, feat_dim, n_points]);

        let joint = self.attention(support_groups.clone()) * self.attention(query_groups.clone());
        let weighted = support_groups * joint;

        let gap = query_groups.mean_dim(1) - weighted.mean_dim(1);
        let gap: Tensor<B, 4> = gap.reshape([n_way, 1, 1, n_points]);

        Ok(support + gap)
    }
}
