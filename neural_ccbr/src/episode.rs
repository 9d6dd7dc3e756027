//! Few-shot episode tensors.

use burn::prelude::*;

use ccbr_core::{CcbrCoreError, EpisodeShape};

use crate::error::{ensure_label_range, ensure_shape, Result};

/// One few-shot segmentation episode.
///
/// Construction checks every tensor against [`EpisodeShape`], so the model
/// can rely on consistent dimensions.
#[derive(Debug, Clone)]
pub struct Episode<B: Backend> {
    shape: EpisodeShape,
    /// Support points `[n_way, k_shot, in_channels, n_points]`.
    pub support: Tensor<B, 4>,
    /// Foreground masks of the support points `[n_way, k_shot, n_points]`.
    pub support_mask: Tensor<B, 3>,
    /// Query points `[n_queries, in_channels, n_points]`.
    pub query: Tensor<B, 3>,
    /// Query labels `[n_queries, n_points]`, 0 is background.
    pub query_labels: Tensor<B, 2, Int>,
}

impl<B: Backend> Episode<B> {
    /// Create an episode from tensors, checking them against `shape`.
    ///
    /// Query labels are range-checked against `0..=n_way`.
    pub fn new(
        shape: EpisodeShape,
        support: Tensor<B, 4>,
        support_mask: Tensor<B, 3>,
        query: Tensor<B, 3>,
        query_labels: Tensor<B, 2, Int>,
    ) -> Result<Self> {
        shape.validate()?;
        ensure_shape("support points", shape.support_shape(), support.dims())?;
        ensure_shape("support mask", shape.support_mask_shape(), support_mask.dims())?;
        ensure_shape("query points", shape.query_shape(), query.dims())?;
        ensure_shape("query labels", shape.query_label_shape(), query_labels.dims())?;
        ensure_label_range(&query_labels, shape.num_classes())?;

        Ok(Self {
            shape,
            support,
            support_mask,
            query,
            query_labels,
        })
    }

    /// Create an episode from flat row-major buffers.
    ///
    /// Labels are range-checked against `0..=n_way`.
    pub fn from_raw(
        shape: EpisodeShape,
        support: Vec<f32>,
        support_mask: Vec<f32>,
        query: Vec<f32>,
        query_labels: Vec<i64>,
        device: &B::Device,
    ) -> Result<Self> {
        shape.validate()?;
        check_len(shape.support_shape().iter().product(), support.len())?;
        check_len(shape.support_mask_shape().iter().product(), support_mask.len())?;
        check_len(shape.query_shape().iter().product(), query.len())?;
        shape.check_labels(&query_labels)?;

        Self::new(
            shape,
            Tensor::from_data(TensorData::new(support, shape.support_shape()), device),
            Tensor::from_data(TensorData::new(support_mask, shape.support_mask_shape()), device),
            Tensor::from_data(TensorData::new(query, shape.query_shape()), device),
            Tensor::from_data(TensorData::new(query_labels, shape.query_label_shape()), device),
        )
    }

    /// Episode dimensions.
    pub fn shape(&self) -> EpisodeShape {
        self.shape
    }

    /// Device holding the episode tensors.
    pub fn device(&self) -> B::Device {
        self.support.device()
    }

    /// Support points flattened to a batch `[n_way * k_shot, in_channels, n_points]`.
    pub fn support_batch(&self) -> Tensor<B, 3> {
        let s = self.shape;
        self.support
            .clone()
            .reshape([s.num_support(), s.in_channels, s.n_points])
    }
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(CcbrCoreError::LengthMismatch { expected, got }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NeuralCcbrError;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn shape() -> EpisodeShape {
        EpisodeShape::new(2, 1, 2, 4, 3)
    }

    #[test]
    fn test_from_raw() {
        let s = shape();
        let episode = Episode::<TestBackend>::from_raw(
            s,
            vec![0.0; 24],
            vec![1.0; 8],
            vec![0.0; 24],
            vec![0, 1, 2, 0, 1, 1, 2, 2],
            &Default::default(),
        )
        .unwrap();

        assert_eq!(episode.shape(), s);
        assert_eq!(episode.support_batch().dims(), [2, 3, 4]);
    }

    #[test]
    fn test_rejects_wrong_buffer_length() {
        let result = Episode::<TestBackend>::from_raw(
            shape(),
            vec![0.0; 23],
            vec![1.0; 8],
            vec![0.0; 24],
            vec![0; 8],
            &Default::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_label_out_of_range() {
        let err = Episode::<TestBackend>::from_raw(
            shape(),
            vec![0.0; 24],
            vec![1.0; 8],
            vec![0.0; 24],
            vec![0, 0, 0, 3, 0, 0, 0, 0],
            &Default::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NeuralCcbrError::Core(CcbrCoreError::LabelOutOfRange { label: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_mismatched_tensor() {
        let device = Default::default();
        let s = shape();
        let err = Episode::<TestBackend>::new(
            s,
            Tensor::zeros(s.support_shape(), &device),
            Tensor::zeros([2, 2, 4], &device),
            Tensor::zeros(s.query_shape(), &device),
            Tensor::zeros(s.query_label_shape(), &device),
        )
        .unwrap_err();

        assert!(matches!(err, NeuralCcbrError::ShapeMismatch { name: "support mask", .. }));
    }

    #[test]
    fn test_new_rejects_label_out_of_range() {
        let device = Default::default();
        let s = shape();
        let err = Episode::<TestBackend>::new(
            s,
            Tensor::zeros(s.support_shape(), &device),
            Tensor::ones(s.support_mask_shape(), &device),
            Tensor::zeros(s.query_shape(), &device),
            Tensor::full(s.query_label_shape(), (s.n_way + 1) as i64, &device),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NeuralCcbrError::Core(CcbrCoreError::LabelOutOfRange { label: 3, num_classes: 3 })
        ));
    }

    #[test]
    fn test_new_rejects_negative_label() {
        let device = Default::default();
        let s = shape();
        let err = Episode::<TestBackend>::new(
            s,
            Tensor::zeros(s.support_shape(), &device),
            Tensor::ones(s.support_mask_shape(), &device),
            Tensor::zeros(s.query_shape(), &device),
            Tensor::full(s.query_label_shape(), -1, &device),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NeuralCcbrError::Core(CcbrCoreError::LabelOutOfRange { label: -1, .. })
        ));
    }
}
