//! Masked average pooling of support features.

use burn::prelude::*;
use burn::tensor::ElementConversion;

use crate::error::{NeuralCcbrError, Result};

/// Added to the mask count so empty masks give near-zero features.
pub const MASK_EPS: f64 = 1e-5;

/// Average features over the points selected by `mask`.
///
/// Input: features `[n_way, k_shot, feat_dim, n_points]`, mask
/// `[n_way, k_shot, n_points]` with values in {0, 1}
/// Output: `[n_way, k_shot, feat_dim]`
pub fn masked_average_pool<B: Backend>(
    features: Tensor<B, 4>,
    mask: Tensor<B, 3>,
) -> Result<Tensor<B, 3>> {
    let [n_way, k_shot, feat_dim, n_points] = features.dims();
    let mask_dims = mask.dims();
    if mask_dims != [n_way, k_shot, n_points] {
        return Err(NeuralCcbrError::shape(
            "support mask",
            &[n_way, k_shot, n_points],
            &mask_dims,
        ));
    }

    let mask = mask.unsqueeze_dim::<4>(2);
    let count = mask.clone().sum_dim(3);

    if log::log_enabled!(log::Level::Debug) {
        let smallest: f32 = count.clone().min().into_scalar().elem();
        if smallest < 0.5 {
            log::debug!("masked pooling over an empty mask; features collapse to zero");
        }
    }

    let summed = (features * mask).sum_dim(3);
    let pooled = summed / count.add_scalar(MASK_EPS);

    Ok(pooled.reshape([n_way, k_shot, feat_dim]))
}

/// Foreground and background masked features.
///
/// The background mask is the complement of `fg_mask`.
pub fn foreground_background<B: Backend>(
    features: Tensor<B, 4>,
    fg_mask: Tensor<B, 3>,
) -> Result<(Tensor<B, 3>, Tensor<B, 3>)> {
    let bg_mask = fg_mask.clone().neg().add_scalar(1.0);
    let fg = masked_average_pool(features.clone(), fg_mask)?;
    let bg = masked_average_pool(features, bg_mask)?;
    Ok((fg, bg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_average_over_selected_points() {
        let device = Default::default();
        // 1 way, 1 shot, 2 channels, 3 points
        let features = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![1.0f32, 2.0, 3.0, 10.0, 20.0, 30.0], [1, 1, 2, 3]),
            &device,
        );
        let mask = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![1.0f32, 0.0, 1.0], [1, 1, 3]),
            &device,
        );

        let pooled: Vec<f32> = masked_average_pool(features, mask)
            .unwrap()
            .to_data()
            .to_vec()
            .unwrap();

        assert!((pooled[0] - 2.0).abs() < 1e-4);
        assert!((pooled[1] - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_mask_is_finite_and_near_zero() {
        let device = Default::default();
        let features = Tensor::<TestBackend, 4>::ones([2, 1, 3, 4], &device);
        let mask = Tensor::<TestBackend, 3>::zeros([2, 1, 4], &device);

        let pooled: Vec<f32> = masked_average_pool(features, mask)
            .unwrap()
            .to_data()
            .to_vec()
            .unwrap();

        assert!(pooled.iter().all(|v| v.is_finite() && v.abs() < 1e-6));
    }

    #[test]
    fn test_mask_shape_mismatch() {
        let device = Default::default();
        let features = Tensor::<TestBackend, 4>::ones([2, 1, 3, 4], &device);
        let mask = Tensor::<TestBackend, 3>::ones([2, 2, 4], &device);

        let err = masked_average_pool(features, mask).unwrap_err();
        assert!(matches!(err, NeuralCcbrError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_background_is_complement() {
        let device = Default::default();
        let features = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![4.0f32, 8.0], [1, 1, 1, 2]),
            &device,
        );
        let mask = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![1.0f32, 0.0], [1, 1, 2]),
            &device,
        );

        let (fg, bg) = foreground_background(features, mask).unwrap();
        let fg: Vec<f32> = fg.to_data().to_vec().unwrap();
        let bg: Vec<f32> = bg.to_data().to_vec().unwrap();

        assert!((fg[0] - 4.0).abs() < 1e-3);
        assert!((bg[0] - 8.0).abs() < 1e-3);
    }
}
