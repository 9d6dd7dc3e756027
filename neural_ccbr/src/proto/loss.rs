//! Segmentation loss over score maps.

use burn::nn::loss::CrossEntropyLossConfig;
use burn::prelude::*;

use crate::error::{ensure_label_range, ensure_shape, Result};

/// Mean cross-entropy of a score map against integer labels.
///
/// Input: logits `[n_queries, classes, n_points]`, labels `[n_queries, n_points]`
/// Output: scalar loss `[1]`
///
/// Labels outside `0..classes` are an error.
pub fn cross_entropy_loss<B: Backend>(
    logits: Tensor<B, 3>,
    labels: Tensor<B, 2, Int>,
) -> Result<Tensor<B, 1>> {
    let [n_queries, classes, n_points] = logits.dims();
    ensure_shape("query labels", [n_queries, n_points], labels.dims())?;
    ensure_label_range(&labels, classes)?;

    let device = logits.device();
    let logits = logits
        .swap_dims(1, 2)
        .reshape([n_queries * n_points, classes]);
    let targets = labels.reshape([n_queries * n_points]);

    let loss = CrossEntropyLossConfig::new()
        .init(&device)
        .forward(logits, targets);
    Ok(loss)
}
