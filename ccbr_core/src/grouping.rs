//! Grouping of batch items for cross-set comparison.
//!
//! Support features are always grouped by way (`k_shot` consecutive shots per
//! group). The query batch is grouped explicitly: `groups` runs of
//! `group_size` consecutive queries, each run averaged into one group.

use core::ops::Range;

use crate::error::{CcbrCoreError, Result};

/// How a batch is partitioned into consecutive, equally sized groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupingScheme {
    /// Number of groups.
    pub groups: usize,
    /// Items per group.
    pub group_size: usize,
}

impl GroupingScheme {
    /// Create a grouping scheme.
    #[inline]
    pub const fn new(groups: usize, group_size: usize) -> Self {
        Self { groups, group_size }
    }

    /// Grouping of the support set: one group per way, `k_shot` shots each.
    #[inline]
    pub const fn support(n_way: usize, k_shot: usize) -> Self {
        Self::new(n_way, k_shot)
    }

    /// Grouping of a query batch against `n_way` support groups.
    ///
    /// Fails when `n_queries != n_way * group_size`.
    pub fn for_queries(n_way: usize, n_queries: usize, group_size: usize) -> Result<Self> {
        let scheme = Self::new(n_way, group_size);
        scheme.check_batch(n_queries)?;
        Ok(scheme)
    }

    /// Total number of items covered by the scheme.
    #[inline]
    pub const fn batch_size(&self) -> usize {
        self.groups * self.group_size
    }

    /// Verify that a batch of `batch` items matches this scheme.
    pub fn check_batch(&self, batch: usize) -> Result<()> {
        if self.groups == 0 || self.group_size == 0 || batch != self.batch_size() {
            return Err(CcbrCoreError::GroupingMismatch {
                batch,
                groups: self.groups,
                group_size: self.group_size,
            });
        }
        Ok(())
    }

    /// Group index of a batch item.
    #[inline]
    pub fn group_of(&self, index: usize) -> Option<usize> {
        if index < self.batch_size() {
            Some(index / self.group_size)
        } else {
            None
        }
    }

    /// Item range covered by `group`.
    #[inline]
    pub fn range(&self, group: usize) -> Range<usize> {
        let start = group * self.group_size;
        start..start + self.group_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_query_per_way() {
        let scheme = GroupingScheme::for_queries(3, 3, 1).unwrap();
        assert_eq!(scheme.batch_size(), 3);
        assert_eq!(scheme.group_of(2), Some(2));
    }

    #[test]
    fn test_averaged_query_groups() {
        let scheme = GroupingScheme::for_queries(3, 15, 5).unwrap();
        assert_eq!(scheme.group_of(0), Some(0));
        assert_eq!(scheme.group_of(4), Some(0));
        assert_eq!(scheme.group_of(5), Some(1));
        assert_eq!(scheme.group_of(14), Some(2));
        assert_eq!(scheme.group_of(15), None);
        assert_eq!(scheme.range(1), 5..10);
    }

    #[test]
    fn test_mismatched_batch() {
        assert_eq!(
            GroupingScheme::for_queries(3, 7, 5),
            Err(CcbrCoreError::GroupingMismatch {
                batch: 7,
                groups: 3,
                group_size: 5
            })
        );
        assert!(GroupingScheme::for_queries(2, 0, 0).is_err());
    }

    #[test]
    fn test_support_grouping() {
        let scheme = GroupingScheme::support(2, 5);
        assert!(scheme.check_batch(10).is_ok());
        assert_eq!(scheme.range(1), 5..10);
    }
}
