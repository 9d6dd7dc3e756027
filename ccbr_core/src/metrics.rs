//! Segmentation metrics over integer label maps.

use crate::error::{CcbrCoreError, Result};

/// Confusion matrix for `num_classes` classes.
///
/// Rows are ground-truth labels, columns are predictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    num_classes: usize,
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    /// Create an empty confusion matrix.
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            counts: vec![0; num_classes * num_classes],
        }
    }

    /// Number of classes.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Accumulate a batch of predictions against ground truth.
    ///
    /// The whole batch is validated first; on error the matrix is unchanged.
    pub fn update(&mut self, predictions: &[i64], truth: &[i64]) -> Result<()> {
        if predictions.len() != truth.len() {
            return Err(CcbrCoreError::LengthMismatch {
                expected: truth.len(),
                got: predictions.len(),
            });
        }
        let cells = predictions
            .iter()
            .zip(truth)
            .map(|(&pred, &gt)| {
                Ok(self.class_index(gt)? * self.num_classes + self.class_index(pred)?)
            })
            .collect::<Result<Vec<usize>>>()?;

        for cell in cells {
            self.counts[cell] += 1;
        }
        Ok(())
    }

    /// Count of points with ground truth `truth` predicted as `predicted`.
    #[inline]
    pub fn count(&self, truth: usize, predicted: usize) -> u64 {
        self.counts[truth * self.num_classes + predicted]
    }

    /// Total number of accumulated points.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Fraction of points predicted correctly (0 when empty).
    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: u64 = (0..self.num_classes).map(|c| self.count(c, c)).sum();
        correct as f32 / total as f32
    }

    /// Intersection-over-union per class; `None` for classes absent from both
    /// predictions and ground truth.
    pub fn class_iou(&self) -> Vec<Option<f32>> {
        (0..self.num_classes)
            .map(|c| {
                let tp = self.count(c, c);
                let fn_: u64 = (0..self.num_classes).map(|p| self.count(c, p)).sum::<u64>() - tp;
                let fp: u64 = (0..self.num_classes).map(|t| self.count(t, c)).sum::<u64>() - tp;
                let union = tp + fn_ + fp;
                (union > 0).then(|| tp as f32 / union as f32)
            })
            .collect()
    }

    /// Mean IoU over the classes that appear.
    pub fn mean_iou(&self) -> f32 {
        let ious: Vec<f32> = self.class_iou().into_iter().flatten().collect();
        if ious.is_empty() {
            0.0
        } else {
            ious.iter().sum::<f32>() / ious.len() as f32
        }
    }

    /// Merge another matrix with the same class count into this one.
    pub fn merge(&mut self, other: &ConfusionMatrix) -> Result<()> {
        if other.num_classes != self.num_classes {
            return Err(CcbrCoreError::LengthMismatch {
                expected: self.num_classes,
                got: other.num_classes,
            });
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        Ok(())
    }

    fn class_index(&self, label: i64) -> Result<usize> {
        if label < 0 || label as usize >= self.num_classes {
            return Err(CcbrCoreError::LabelOutOfRange {
                label,
                num_classes: self.num_classes,
            });
        }
        Ok(label as usize)
    }
}
