//! Error types for neural_ccbr.

use burn::prelude::*;
use burn::tensor::ElementConversion;
use ccbr_core::CcbrCoreError;
use thiserror::Error;

/// Errors that can occur while building or running the few-shot model.
#[derive(Error, Debug)]
pub enum NeuralCcbrError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Tensor shape mismatch.
    #[error("tensor shape mismatch for {name}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Which tensor was checked.
        name: &'static str,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// Error from the backend-free core (unsupported metric, grouping, labels).
    #[error(transparent)]
    Core(#[from] CcbrCoreError),

    /// Invalid or corrupted data.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl NeuralCcbrError {
    pub(crate) fn shape(name: &'static str, expected: &[usize], got: &[usize]) -> Self {
        NeuralCcbrError::ShapeMismatch {
            name,
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}

/// Result type for neural_ccbr operations.
pub type Result<T> = std::result::Result<T, NeuralCcbrError>;

/// Check a tensor shape against the expected one.
pub(crate) fn ensure_shape<const D: usize>(
    name: &'static str,
    expected: [usize; D],
    got: [usize; D],
) -> Result<()> {
    if expected != got {
        return Err(NeuralCcbrError::shape(name, &expected, &got));
    }
    Ok(())
}

/// Check that every label lies in `0..num_classes`.
///
/// Reports the smallest label when it is negative, otherwise the largest.
pub(crate) fn ensure_label_range<B: Backend, const D: usize>(
    labels: &Tensor<B, D, Int>,
    num_classes: usize,
) -> Result<()> {
    if labels.dims().iter().product::<usize>() == 0 {
        return Ok(());
    }

    let min = labels.clone().min().into_scalar().elem::<i64>();
    if min < 0 {
        return Err(CcbrCoreError::LabelOutOfRange { label: min, num_classes }.into());
    }
    let max = labels.clone().max().into_scalar().elem::<i64>();
    if max as usize >= num_classes {
        return Err(CcbrCoreError::LabelOutOfRange { label: max, num_classes }.into());
    }
    Ok(())
}
