//! Error types for ccbr_core operations.
//!
//! Provides a simple error enum with no external dependencies.

use core::fmt;

/// Error types that can occur during ccbr_core operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CcbrCoreError {
    /// The requested similarity method is not one of `cosine` or `euclidean`.
    UnsupportedSimilarity {
        /// The method name that was requested.
        method: String,
    },
    /// An episode dimension that must be positive was zero.
    ZeroDimension {
        /// Name of the offending dimension.
        name: &'static str,
    },
    /// The query batch cannot be split into the requested groups.
    GroupingMismatch {
        /// Number of items in the batch.
        batch: usize,
        /// Number of groups requested.
        groups: usize,
        /// Number of items per group.
        group_size: usize,
    },
    /// A class label is outside `0..num_classes`.
    LabelOutOfRange {
        /// The offending label.
        label: i64,
        /// Number of classes.
        num_classes: usize,
    },
    /// Two sequences that must have equal length do not.
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
}

impl fmt::Display for CcbrCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CcbrCoreError::UnsupportedSimilarity { method } => {
                write!(f, "unsupported similarity method: {}", method)
            }
            CcbrCoreError::ZeroDimension { name } => {
                write!(f, "episode dimension {} must be positive", name)
            }
            CcbrCoreError::GroupingMismatch {
                batch,
                groups,
                group_size,
            } => write!(
                f,
                "cannot split {} items into {} groups of {}",
                batch, groups, group_size
            ),
            CcbrCoreError::LabelOutOfRange { label, num_classes } => {
                write!(f, "label {} outside 0..{}", label, num_classes)
            }
            CcbrCoreError::LengthMismatch { expected, got } => {
                write!(f, "length mismatch: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for CcbrCoreError {}

/// Result type for ccbr_core operations.
pub type Result<T> = core::result::Result<T, CcbrCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CcbrCoreError::UnsupportedSimilarity {
            method: "manhattan".to_string(),
        };
        assert_eq!(format!("{}", err), "unsupported similarity method: manhattan");

        let err = CcbrCoreError::ZeroDimension { name: "k_shot" };
        assert_eq!(format!("{}", err), "episode dimension k_shot must be positive");

        let err = CcbrCoreError::GroupingMismatch {
            batch: 7,
            groups: 3,
            group_size: 5,
        };
        assert_eq!(format!("{}", err), "cannot split 7 items into 3 groups of 5");

        let err = CcbrCoreError::LabelOutOfRange {
            label: 4,
            num_classes: 3,
        };
        assert_eq!(format!("{}", err), "label 4 outside 0..3");
    }

    #[test]
    fn test_error_equality() {
        let err1 = CcbrCoreError::ZeroDimension { name: "n_way" };
        let err2 = CcbrCoreError::ZeroDimension { name: "n_way" };
        let err3 = CcbrCoreError::ZeroDimension { name: "k_shot" };

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
