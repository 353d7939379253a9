//! Scoring policies for candidate domain-tree refinements.

use tracing::{instrument, trace};

use super::space::SearchSpace;
use crate::domain::{Domains, RealDomain, WhereFlag};
use crate::tree::{AddTree, FeatId, LtSplit};

/// Which end of the score range a [`Measure`] prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Maximize,
    Minimize,
}

impl Direction {
    /// Returns true if `candidate` beats `incumbent`. Equal scores never win,
    /// and any number beats NaN.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        if incumbent.is_nan() {
            return !candidate.is_nan();
        }
        match self {
            Direction::Maximize => candidate > incumbent,
            Direction::Minimize => candidate < incumbent,
        }
    }
}

/// Scores refining a domain-tree leaf with bounds `domains` by `split`.
///
/// Implementations own their comparison direction; the search space takes the
/// best score in that direction without assuming one itself.
///
/// Closures `FnMut(&SearchSpace, &Domains, LtSplit) -> f64` are measures that
/// maximize.
pub trait Measure {
    fn score(&mut self, space: &SearchSpace, domains: &Domains, split: LtSplit) -> f64;

    fn direction(&self) -> Direction {
        Direction::Maximize
    }
}

impl<F> Measure for F
where
    F: FnMut(&SearchSpace, &Domains, LtSplit) -> f64,
{
    fn score(&mut self, space: &SearchSpace, domains: &Domains, split: LtSplit) -> f64 {
        self(space, domains, split)
    }
}

/// Counts ensemble nodes that stop being reachable when a leaf is refined.
///
/// For a candidate `split` on feature `f` with current domain `D`, both halves
/// `D_l = [lo, t)` and `D_r = [t, hi)` are considered. For each half, every
/// node of every ensemble tree that is reachable under the leaf's domains but
/// not once `f` is narrowed to the half is counted; a cut branch contributes
/// its whole reachable subtree. The score is the sum over both halves.
///
/// Higher is better ([`Direction::Maximize`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableNodesMeasure;

impl UnreachableNodesMeasure {
    /// Nodes reachable under `parent_domains` that become unreachable when
    /// the domain of `feat_id` is replaced by `new_domain`.
    #[instrument(level = "trace", skip(self, addtree, parent_domains))]
    pub fn count_unreachable_nodes(
        &self,
        addtree: &AddTree,
        parent_domains: &Domains,
        feat_id: FeatId,
        new_domain: RealDomain,
    ) -> usize {
        let mut unreachable = 0;
        let mut stack = Vec::new();

        for tree in addtree {
            stack.push((0, false));
            while let Some((id, cut)) = stack.pop() {
                if cut {
                    unreachable += 1;
                }
                let Some((split, left, right)) = tree.internal(id) else {
                    continue;
                };

                let parent_dom = parent_domains.domain_or_everything(split.feat_id);
                let (left_before, right_before) = reachable_branches(&parent_dom, split);
                let (left_after, right_after) = if split.feat_id == feat_id {
                    reachable_branches(&new_domain, split)
                } else {
                    (left_before, right_before)
                };

                if right_before {
                    stack.push((right, cut || !right_after));
                }
                if left_before {
                    stack.push((left, cut || !left_after));
                }
            }
        }

        unreachable
    }
}

/// Which branches of `split` some value of `dom` can take: the left branch
/// needs `lo < t`, the right branch needs `t < hi`.
fn reachable_branches(dom: &RealDomain, split: LtSplit) -> (bool, bool) {
    match dom.where_is_strict(split.split_value) {
        WhereFlag::Left => (false, true),
        WhereFlag::InDomain => (true, true),
        WhereFlag::Right => (true, false),
    }
}

impl Measure for UnreachableNodesMeasure {
    fn score(&mut self, space: &SearchSpace, domains: &Domains, split: LtSplit) -> f64 {
        let dom = domains.domain_or_everything(split.feat_id);
        let Some((dom_l, dom_r)) = dom.try_split(split.split_value) else {
            return 0.0;
        };

        let addtree = space.addtree();
        let unreachable_l = self.count_unreachable_nodes(addtree, domains, split.feat_id, dom_l);
        let unreachable_r = self.count_unreachable_nodes(addtree, domains, split.feat_id, dom_r);
        trace!(%split, unreachable_l, unreachable_r, "scored candidate");

        (unreachable_l + unreachable_r) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;
    use std::sync::Arc;

    /// `X0 < 0.5 ? (X0 < 0.25 ? a : b) : (X1 < 1 ? c : d)`
    fn nested_tree() -> Tree<f64> {
        let mut tree = Tree::new(0.0);
        let (l, r) = tree.split(0, LtSplit::new(0, 0.5)).unwrap();
        tree.split(l, LtSplit::new(0, 0.25)).unwrap();
        tree.split(r, LtSplit::new(1, 1.0)).unwrap();
        tree
    }

    #[test]
    fn test_direction_is_better() {
        assert!(Direction::Maximize.is_better(2.0, 1.0));
        assert!(!Direction::Maximize.is_better(1.0, 1.0));
        assert!(Direction::Minimize.is_better(1.0, 2.0));
        assert!(Direction::Minimize.is_better(1.0, f64::NAN));
        assert!(!Direction::Maximize.is_better(f64::NAN, 1.0));
    }

    #[test]
    fn test_count_unreachable_nodes_cuts_whole_subtree() {
        let mut at = AddTree::new();
        at.add_tree(nested_tree());
        let doms = Domains::new(2);
        let measure = UnreachableNodesMeasure;

        // Committing X0 to [-inf, 0.5) removes the right subtree: 3 nodes.
        let left = RealDomain::new(f64::NEG_INFINITY, 0.5);
        assert_eq!(measure.count_unreachable_nodes(&at, &doms, 0, left), 3);

        // [0.5, inf) removes the left subtree: 3 nodes.
        let right = RealDomain::new(0.5, f64::INFINITY);
        assert_eq!(measure.count_unreachable_nodes(&at, &doms, 0, right), 3);

        // [0.3, inf) keeps X0 < 0.5 reachable but cuts X0 < 0.25: 1 node.
        let narrow = RealDomain::new(0.3, f64::INFINITY);
        assert_eq!(measure.count_unreachable_nodes(&at, &doms, 0, narrow), 1);

        // [0, 0.25) removes X0 >= 0.5 (3 nodes) and X0 >= 0.25 (1 node).
        let narrowest = RealDomain::new(0.0, 0.25);
        assert_eq!(measure.count_unreachable_nodes(&at, &doms, 0, narrowest), 4);
    }

    #[test]
    fn test_count_ignores_already_unreachable_nodes() {
        let mut at = AddTree::new();
        at.add_tree(nested_tree());
        let doms = Domains::from_vec(vec![RealDomain::new(0.0, 0.5), RealDomain::everything()]);
        let measure = UnreachableNodesMeasure;

        // The right subtree is unreachable already; only leaf `b` is cut.
        let new_domain = RealDomain::new(0.0, 0.25);
        assert_eq!(measure.count_unreachable_nodes(&at, &doms, 0, new_domain), 1);
    }

    #[test]
    fn test_count_other_feature_untouched() {
        let mut at = AddTree::new();
        at.add_tree(nested_tree());
        let doms = Domains::new(2);
        let measure = UnreachableNodesMeasure;

        let new_domain = RealDomain::new(2.0, 3.0);
        assert_eq!(measure.count_unreachable_nodes(&at, &doms, 1, new_domain), 1);
    }

    #[test]
    fn test_score_sums_both_halves() {
        let mut at = AddTree::new();
        at.add_tree(nested_tree());
        at.add_tree(Tree::new(0.0));
        let space = SearchSpace::new(Arc::new(at));
        let doms = space.root_domains().clone();

        let mut measure = UnreachableNodesMeasure;
        assert_eq!(measure.score(&space, &doms, LtSplit::new(0, 0.5)), 6.0);
        // Left half cuts X0 >= 0.5 (3 nodes) and X0 >= 0.25 (1); right half only
        // cuts the leaf under X0 < 0.25 (1).
        assert_eq!(measure.score(&space, &doms, LtSplit::new(0, 0.25)), 5.0);
        assert_eq!(measure.direction(), Direction::Maximize);
    }

    #[test]
    fn test_closure_is_a_measure() {
        let space = SearchSpace::new(Arc::new(AddTree::new()));
        let mut calls = 0;
        let mut measure = |_: &SearchSpace, _: &Domains, split: LtSplit| {
            calls += 1;
            split.split_value
        };
        let doms = Domains::new(1);
        assert_eq!(measure.score(&space, &doms, LtSplit::new(0, 1.5)), 1.5);
        assert_eq!(Measure::direction(&measure), Direction::Maximize);
        drop(measure);
        assert_eq!(calls, 1);
    }
}
