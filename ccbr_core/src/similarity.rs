//! Similarity metric selection and scalar reference math.
//!
//! The tensor implementation in `neural_ccbr` dispatches on [`SimilarityMetric`];
//! the scalar functions here are the reference it is tested against.

use core::fmt;
use core::str::FromStr;

use crate::error::{CcbrCoreError, Result};

/// Default multiplier applied to cosine similarity.
pub const DEFAULT_COSINE_SCALE: f32 = 20.0;

/// Lower bound applied to vector norms in cosine similarity.
pub const COSINE_EPS: f32 = 1e-8;

/// Metric used to score a point feature against a prototype.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SimilarityMetric {
    /// Cosine similarity multiplied by `scale`.
    Cosine {
        /// Multiplier applied to the cosine value.
        scale: f32,
    },
    /// Negative squared Euclidean distance.
    #[default]
    Euclidean,
}

impl SimilarityMetric {
    /// Resolve a metric from its configuration name.
    ///
    /// `scale` is only used by the cosine metric.
    pub fn from_name(name: &str, scale: f32) -> Result<Self> {
        match name {
            "cosine" => Ok(SimilarityMetric::Cosine { scale }),
            "euclidean" => Ok(SimilarityMetric::Euclidean),
            other => Err(CcbrCoreError::UnsupportedSimilarity {
                method: other.to_string(),
            }),
        }
    }

    /// Configuration name of the metric.
    pub const fn name(&self) -> &'static str {
        match self {
            SimilarityMetric::Cosine { .. } => "cosine",
            SimilarityMetric::Euclidean => "euclidean",
        }
    }

    /// Score a single feature vector against a prototype.
    pub fn score(&self, feature: &[f32], prototype: &[f32]) -> Result<f32> {
        if feature.len() != prototype.len() {
            return Err(CcbrCoreError::LengthMismatch {
                expected: prototype.len(),
                got: feature.len(),
            });
        }
        Ok(match self {
            SimilarityMetric::Cosine { scale } => cosine(feature, prototype) * scale,
            SimilarityMetric::Euclidean => -squared_euclidean(feature, prototype),
        })
    }
}

impl FromStr for SimilarityMetric {
    type Err = CcbrCoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s, DEFAULT_COSINE_SCALE)
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityMetric::Cosine { scale } => write!(f, "cosine(x{})", scale),
            SimilarityMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Cosine similarity with each norm clamped to [`COSINE_EPS`].
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt().max(COSINE_EPS);
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt().max(COSINE_EPS);
    dot / (norm_a * norm_b)
}

/// Squared Euclidean distance.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
