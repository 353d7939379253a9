//! Hyper-rectangle over the feature space: one [`RealDomain`] per feature.

use std::fmt::Display;
use std::ops::{Index, IndexMut};

use super::real_domain::RealDomain;
use crate::error::{DomTreeError, Result};
use crate::tree::{FeatId, LtSplit};

/// Feature-indexed collection of [`RealDomain`]s.
///
/// Features without an explicit bound span everything. Comparisons between
/// two `Domains` of different length treat the missing tail as unbounded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Domains(Vec<RealDomain>);

impl Domains {
    /// Creates `num_features` unbounded domains.
    pub fn new(num_features: usize) -> Self {
        Self(vec![RealDomain::everything(); num_features])
    }

    pub fn from_vec(domains: Vec<RealDomain>) -> Self {
        Self(domains)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Grows or shrinks to `num_features`; new features span everything.
    pub fn resize(&mut self, num_features: usize) {
        self.0.resize(num_features, RealDomain::everything());
    }

    pub fn get(&self, feat_id: FeatId) -> Result<&RealDomain> {
        let len = self.0.len();
        self.0
            .get(feat_id)
            .ok_or_else(|| DomTreeError::feature_out_of_range(feat_id, len))
    }

    pub fn get_mut(&mut self, feat_id: FeatId) -> Result<&mut RealDomain> {
        let len = self.0.len();
        self.0
            .get_mut(feat_id)
            .ok_or_else(|| DomTreeError::feature_out_of_range(feat_id, len))
    }

    /// Returns the domain of `feat_id`, or everything when not tracked.
    pub fn domain_or_everything(&self, feat_id: FeatId) -> RealDomain {
        self.0.get(feat_id).copied().unwrap_or_default()
    }

    /// Sets the domain of `feat_id`, growing the collection when needed.
    pub fn set(&mut self, feat_id: FeatId, domain: RealDomain) {
        if feat_id >= self.0.len() {
            self.resize(feat_id + 1);
        }
        self.0[feat_id] = domain;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RealDomain> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[RealDomain] {
        &self.0
    }

    /// Intersects the domain of `split.feat_id` with the branch of `split`
    /// selected by `go_left` (`x < threshold` when true, `x >= threshold`
    /// otherwise).
    ///
    /// A threshold outside the current domain leaves an empty domain at the
    /// nearest bound for the branch that cannot be taken.
    pub fn refine(&mut self, split: LtSplit, go_left: bool) {
        let current = self.domain_or_everything(split.feat_id);
        let t = split.split_value;
        let refined = if go_left {
            let hi = current.hi().min(t);
            RealDomain::new(current.lo().min(hi), hi)
        } else {
            let lo = current.lo().max(t);
            RealDomain::new(lo, current.hi().max(lo))
        };
        self.set(split.feat_id, refined);
    }

    /// Returns true if the hyper-rectangles share at least one point.
    pub fn overlaps(&self, other: &Domains) -> bool {
        let n = self.len().max(other.len());
        (0..n).all(|i| {
            self.domain_or_everything(i)
                .overlaps(&other.domain_or_everything(i))
        })
    }

    /// Returns true if `other` ⊆ `self` in every feature.
    pub fn covers(&self, other: &Domains) -> bool {
        let n = self.len().max(other.len());
        (0..n).all(|i| {
            self.domain_or_everything(i)
                .covers(&other.domain_or_everything(i))
        })
    }
}

impl From<Vec<RealDomain>> for Domains {
    fn from(domains: Vec<RealDomain>) -> Self {
        Self(domains)
    }
}

impl Index<FeatId> for Domains {
    type Output = RealDomain;

    fn index(&self, feat_id: FeatId) -> &RealDomain {
        &self.0[feat_id]
    }
}

impl IndexMut<FeatId> for Domains {
    fn index_mut(&mut self, feat_id: FeatId) -> &mut RealDomain {
        &mut self.0[feat_id]
    }
}

impl<'a> IntoIterator for &'a Domains {
    type Item = &'a RealDomain;
    type IntoIter = std::slice::Iter<'a, RealDomain>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Domains {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Domains {{")?;
        let mut first = true;
        for (feat_id, dom) in self.0.iter().enumerate() {
            if dom.is_everything() {
                continue;
            }
            if !first {
                write!(f, ",")?;
            }
            write!(f, " X{feat_id}: {dom}")?;
            first = false;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unbounded() {
        let doms = Domains::new(3);
        assert_eq!(doms.len(), 3);
        assert!(doms.iter().all(|d| d.is_everything()));
    }

    #[test]
    fn test_get_out_of_range() {
        let doms = Domains::new(2);
        assert!(doms.get(1).is_ok());
        assert_eq!(
            doms.get(2),
            Err(DomTreeError::OutOfRange {
                kind: "feature",
                id: 2,
                len: 2
            })
        );
    }

    #[test]
    fn test_set_grows() {
        let mut doms = Domains::new(1);
        doms.set(3, RealDomain::new(0.0, 1.0));
        assert_eq!(doms.len(), 4);
        assert!(doms[2].is_everything());
        assert_eq!(doms[3], RealDomain::new(0.0, 1.0));
    }

    #[test]
    fn test_refine_both_branches() {
        let mut left = Domains::from_vec(vec![RealDomain::new(0.0, 1.0)]);
        let mut right = left.clone();
        let split = LtSplit::new(0, 0.25);

        left.refine(split, true);
        right.refine(split, false);

        assert_eq!(left[0], RealDomain::new(0.0, 0.25));
        assert_eq!(right[0], RealDomain::new(0.25, 1.0));
        assert!(!left.overlaps(&right));
    }

    #[test]
    fn test_refine_threshold_outside_leaves_empty_branch() {
        let mut doms = Domains::from_vec(vec![RealDomain::new(0.0, 1.0)]);
        doms.refine(LtSplit::new(0, -1.0), true);
        assert!(doms[0].is_empty());
    }

    #[test]
    fn test_overlaps_treats_missing_features_as_unbounded() {
        let a = Domains::from_vec(vec![RealDomain::new(0.0, 1.0)]);
        let b = Domains::from_vec(vec![RealDomain::new(0.5, 2.0), RealDomain::new(3.0, 4.0)]);
        assert!(a.overlaps(&b));
        assert!(!b.covers(&a));
        assert!(Domains::new(2).covers(&b));
    }

    #[test]
    fn test_display_skips_unbounded() {
        let mut doms = Domains::new(3);
        doms.set(1, RealDomain::new(0.0, 1.0));
        assert_eq!(doms.to_string(), "Domains { X1: [0, 1) }");
    }
}
