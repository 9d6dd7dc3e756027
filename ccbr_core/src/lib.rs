//! # ccbr_core
//!
//! Backend-free building blocks for few-shot point-cloud segmentation with
//! cross-set bias correction.
//!
//! This crate holds everything that does not need a tensor engine: episode
//! dimensions and their validation, the explicit grouping scheme used when
//! comparing support and query sets, similarity metric selection (with scalar
//! reference implementations), and segmentation metrics.
//!
//! ## Modules
//!
//! - [`types`]: Episode dimensions and derived tensor shapes
//! - [`grouping`]: Partitioning of support/query batches into groups
//! - [`similarity`]: Similarity metric selection and scalar reference math
//! - [`metrics`]: Confusion matrix, accuracy and IoU
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```ignore
//! use ccbr_core::prelude::*;
//!
//! let shape = EpisodeShape::new(2, 1, 2, 2048, 9);
//! shape.validate()?;
//!
//! let metric = SimilarityMetric::from_name("cosine", 20.0)?;
//! let grouping = GroupingScheme::for_queries(shape.n_way, shape.n_queries, 1)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod grouping;
pub mod metrics;
pub mod similarity;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::CcbrCoreError;
    pub use crate::grouping::GroupingScheme;
    pub use crate::metrics::ConfusionMatrix;
    pub use crate::similarity::{SimilarityMetric, COSINE_EPS, DEFAULT_COSINE_SCALE};
    pub use crate::types::EpisodeShape;
}

pub use error::{CcbrCoreError, Result};
pub use grouping::GroupingScheme;
pub use metrics::ConfusionMatrix;
pub use similarity::{cosine, squared_euclidean, SimilarityMetric, COSINE_EPS, DEFAULT_COSINE_SCALE};
pub use types::EpisodeShape;
