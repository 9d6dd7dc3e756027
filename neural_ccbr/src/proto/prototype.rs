//! Class prototypes built from masked support features.

use burn::prelude::*;

use crate::error::{ensure_shape, Result};

/// Prototypes of one episode: one background and `n_way` foreground vectors.
///
/// Built fresh for every episode and never cached.
#[derive(Debug, Clone)]
pub struct Prototypes<B: Backend> {
    /// Background prototype `[feat_dim]`.
    pub background: Tensor<B, 1>,
    /// Foreground prototypes `[n_way, feat_dim]`.
    pub foreground: Tensor<B, 2>,
}

impl<B: Backend> Prototypes<B> {
    /// Average masked support features into prototypes.
    ///
    /// Foreground prototype `i` averages the `k_shot` foreground features of
    /// way `i` only. The background prototype averages every background
    /// feature of the episode.
    ///
    /// Input: fg and bg `[n_way, k_shot, feat_dim]`
    pub fn aggregate(fg: Tensor<B, 3>, bg: Tensor<B, 3>) -> Result<Self> {
        let [n_way, k_shot, feat_dim] = fg.dims();
        ensure_shape("background features", [n_way, k_shot, feat_dim], bg.dims())?;

        let foreground = fg
            .sum_dim(1)
            .div_scalar(k_shot as f64)
            .reshape([n_way, feat_dim]);
        let background = bg
            .reshape([n_way * k_shot, feat_dim])
            .sum_dim(0)
            .div_scalar((n_way * k_shot) as f64)
            .reshape([feat_dim]);

        Ok(Self {
            background,
            foreground,
        })
    }

    /// Number of prototypes, `n_way + 1`.
    pub fn len(&self) -> usize {
        self.foreground.dims()[0] + 1
    }

    /// Always false; an episode has at least the background prototype.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Feature width.
    pub fn feat_dim(&self) -> usize {
        self.background.dims()[0]
    }

    /// Prototype `index`, where 0 is background.
    pub fn get(&self, index: usize) -> Option<Tensor<B, 1>> {
        if index == 0 {
            return Some(self.background.clone());
        }
        if index >= self.len() {
            return None;
        }
        let feat_dim = self.feat_dim();
        Some(
            self.foreground
                .clone()
                .narrow(0, index - 1, 1)
                .reshape([feat_dim]),
        )
    }

    /// Prototypes in class order: `[background, way 0, way 1, ...]`.
    pub fn to_vec(&self) -> Vec<Tensor<B, 1>> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// All prototypes stacked in class order, `[n_way + 1, feat_dim]`.
    pub fn stacked(&self) -> Tensor<B, 2> {
        Tensor::cat(
            vec![self.background.clone().unsqueeze::<2>(), self.foreground.clone()],
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tensor3(values: Vec<f32>, shape: [usize; 3]) -> Tensor<TestBackend, 3> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    #[test]
    fn test_prototype_count_and_order() {
        // 2 ways, 2 shots, 1 channel
        let fg = tensor3(vec![1.0, 3.0, 10.0, 30.0], [2, 2, 1]);
        let bg = tensor3(vec![0.0, 4.0, 8.0, 12.0], [2, 2, 1]);

        let protos = Prototypes::aggregate(fg, bg).unwrap();
        assert_eq!(protos.len(), 3);

        let values: Vec<f32> = protos.stacked().to_data().to_vec().unwrap();
        assert_eq!(values, vec![6.0, 2.0, 20.0]);
    }

    #[test]
    fn test_foreground_depends_only_on_own_way() {
        let fg_a = tensor3(vec![1.0, 1.0, 5.0, 5.0], [2, 1, 2]);
        let fg_b = tensor3(vec![1.0, 1.0, -7.0, 9.0], [2, 1, 2]);
        let bg = tensor3(vec![0.0; 4], [2, 1, 2]);

        let a = Prototypes::aggregate(fg_a, bg.clone()).unwrap();
        let b = Prototypes::aggregate(fg_b, bg).unwrap();

        let way0_a: Vec<f32> = a.get(1).unwrap().to_data().to_vec().unwrap();
        let way0_b: Vec<f32> = b.get(1).unwrap().to_data().to_vec().unwrap();
        assert_eq!(way0_a, way0_b);
    }

    #[test]
    fn test_get_out_of_range() {
        let protos = Prototypes::aggregate(
            tensor3(vec![0.0; 2], [1, 1, 2]),
            tensor3(vec![0.0; 2], [1, 1, 2]),
        )
        .unwrap();

        assert!(protos.get(1).is_some());
        assert!(protos.get(2).is_none());
        assert_eq!(protos.to_vec().len(), 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = Prototypes::aggregate(
            tensor3(vec![0.0; 4], [2, 1, 2]),
            tensor3(vec![0.0; 4], [1, 2, 2]),
        );
        assert!(result.is_err());
    }
}
