//! Core data types describing a few-shot segmentation episode.

use crate::error::{CcbrCoreError, Result};

/// Dimensions of one few-shot segmentation episode.
///
/// The tensor layouts derived from it are:
///
/// | tensor          | shape                                      |
/// |-----------------|--------------------------------------------|
/// | support points  | `[n_way, k_shot, in_channels, n_points]`   |
/// | support masks   | `[n_way, k_shot, n_points]`                |
/// | query points    | `[n_queries, in_channels, n_points]`       |
/// | query labels    | `[n_queries, n_points]`, values `0..=n_way`|
/// | score map       | `[n_queries, n_way + 1, n_points]`         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpisodeShape {
    /// Number of foreground classes.
    pub n_way: usize,
    /// Support examples per class.
    pub k_shot: usize,
    /// Number of query point clouds.
    pub n_queries: usize,
    /// Points per cloud.
    pub n_points: usize,
    /// Input channels per point.
    pub in_channels: usize,
}

impl EpisodeShape {
    /// Create a new episode shape.
    #[inline]
    pub const fn new(
        n_way: usize,
        k_shot: usize,
        n_queries: usize,
        n_points: usize,
        in_channels: usize,
    ) -> Self {
        Self {
            n_way,
            k_shot,
            n_queries,
            n_points,
            in_channels,
        }
    }

    /// Check that every dimension is positive.
    pub fn validate(&self) -> Result<()> {
        let dims = [
            ("n_way", self.n_way),
            ("k_shot", self.k_shot),
            ("n_queries", self.n_queries),
            ("n_points", self.n_points),
            ("in_channels", self.in_channels),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(CcbrCoreError::ZeroDimension { name });
            }
        }
        Ok(())
    }

    /// Number of classes including background.
    #[inline]
    pub const fn num_classes(&self) -> usize {
        self.n_way + 1
    }

    /// Number of support shots across all ways.
    #[inline]
    pub const fn num_support(&self) -> usize {
        self.n_way * self.k_shot
    }

    /// Shape of the support point tensor.
    #[inline]
    pub const fn support_shape(&self) -> [usize; 4] {
        [self.n_way, self.k_shot, self.in_channels, self.n_points]
    }

    /// Shape of the support mask tensor.
    #[inline]
    pub const fn support_mask_shape(&self) -> [usize; 3] {
        [self.n_way, self.k_shot, self.n_points]
    }

    /// Shape of the query point tensor.
    #[inline]
    pub const fn query_shape(&self) -> [usize; 3] {
        [self.n_queries, self.in_channels, self.n_points]
    }

    /// Shape of the query label tensor.
    #[inline]
    pub const fn query_label_shape(&self) -> [usize; 2] {
        [self.n_queries, self.n_points]
    }

    /// Shape of the score map produced by the classifier.
    #[inline]
    pub const fn score_shape(&self) -> [usize; 3] {
        [self.n_queries, self.n_way + 1, self.n_points]
    }

    /// Check that every label lies in `0..=n_way`.
    pub fn check_labels(&self, labels: &[i64]) -> Result<()> {
        let expected = self.n_queries * self.n_points;
        if labels.len() != expected {
            return Err(CcbrCoreError::LengthMismatch {
                expected,
                got: labels.len(),
            });
        }
        let num_classes = self.num_classes();
        match labels
            .iter()
            .find(|&&l| l < 0 || l as usize >= num_classes)
        {
            Some(&label) => Err(CcbrCoreError::LabelOutOfRange { label, num_classes }),
            None => Ok(()),
        }
    }
}
