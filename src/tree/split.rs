//! Less-than decision predicate on a single feature.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::domain::FloatT;

/// Feature index.
pub type FeatId = usize;

/// Decision `X[feat_id] < split_value`: true goes left, false goes right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtSplit {
    pub feat_id: FeatId,
    pub split_value: FloatT,
}

impl LtSplit {
    pub const fn new(feat_id: FeatId, split_value: FloatT) -> Self {
        Self {
            feat_id,
            split_value,
        }
    }

    /// Returns true when `value` takes the left branch.
    pub fn test(&self, value: FloatT) -> bool {
        value < self.split_value
    }
}

impl Display for LtSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X{} < {}", self.feat_id, self.split_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lt_split_test() {
        let split = LtSplit::new(2, 0.5);
        assert!(split.test(0.25));
        assert!(!split.test(0.5));
        assert!(!split.test(0.75));
    }

    #[test]
    fn test_lt_split_display() {
        assert_eq!(LtSplit::new(3, 1.5).to_string(), "X3 < 1.5");
    }
}
