//! Additive ensemble of regression trees.

use std::collections::BTreeMap;

use super::arena::Tree;
use super::split::FeatId;
use crate::domain::FloatT;
use crate::error::{DomTreeError, Result};

/// Ordered ensemble whose prediction is `base_score + Σ tree outputs`.
///
/// Built once by appending trees, then shared read-only (typically behind an
/// `Arc`) by every search space analysing it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddTree {
    pub base_score: FloatT,
    trees: Vec<Tree<FloatT>>,
}

impl AddTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_score(base_score: FloatT) -> Self {
        Self {
            base_score,
            trees: Vec::new(),
        }
    }

    /// Appends `tree` and returns its index.
    pub fn add_tree(&mut self, tree: Tree<FloatT>) -> usize {
        self.trees.push(tree);
        self.trees.len() - 1
    }

    /// Appends a single-leaf tree and returns it for in-place construction.
    pub fn add_empty_tree(&mut self) -> &mut Tree<FloatT> {
        self.trees.push(Tree::new(0.0));
        let last = self.trees.len() - 1;
        &mut self.trees[last]
    }

    pub fn size(&self) -> usize {
        self.trees.len()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Tree<FloatT>> {
        self.trees.get(index).ok_or(DomTreeError::OutOfRange {
            kind: "tree",
            id: index,
            len: self.trees.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tree<FloatT>> {
        self.trees.iter()
    }

    pub fn trees(&self) -> &[Tree<FloatT>] {
        &self.trees
    }

    /// Total node count over all trees.
    pub fn num_nodes(&self) -> usize {
        self.trees.iter().map(Tree::num_nodes).sum()
    }

    /// One past the highest feature id split on anywhere in the ensemble.
    pub fn num_features(&self) -> usize {
        self.trees
            .iter()
            .filter_map(Tree::max_feature_id)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Sorted, deduplicated thresholds per feature over the whole ensemble.
    pub fn get_splits(&self) -> BTreeMap<FeatId, Vec<FloatT>> {
        let mut splits: BTreeMap<FeatId, Vec<FloatT>> = BTreeMap::new();
        for tree in &self.trees {
            tree.collect_splits(&mut splits);
        }
        for values in splits.values_mut() {
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();
        }
        splits
    }

    pub fn predict_single(&self, example: &[FloatT]) -> Result<FloatT> {
        let mut sum = self.base_score;
        for tree in &self.trees {
            sum += *tree.predict_single(example)?;
        }
        Ok(sum)
    }

    pub fn predict(&self, examples: &[Vec<FloatT>]) -> Result<Vec<FloatT>> {
        examples.iter().map(|e| self.predict_single(e)).collect()
    }
}

impl<'a> IntoIterator for &'a AddTree {
    type Item = &'a Tree<FloatT>;
    type IntoIter = std::slice::Iter<'a, Tree<FloatT>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::LtSplit;

    fn stump(feat_id: FeatId, threshold: FloatT, left: FloatT, right: FloatT) -> Tree<FloatT> {
        let mut tree = Tree::new(0.0);
        let (l, r) = tree.split(0, LtSplit::new(feat_id, threshold)).unwrap();
        tree.set_leaf_value(l, left).unwrap();
        tree.set_leaf_value(r, right).unwrap();
        tree
    }

    #[test]
    fn test_add_tree_and_size() {
        let mut at = AddTree::new();
        assert!(at.is_empty());
        assert_eq!(at.add_tree(stump(0, 0.5, 1.0, -1.0)), 0);
        assert_eq!(at.add_tree(Tree::new(0.0)), 1);
        assert_eq!(at.size(), 2);
        assert_eq!(at.num_nodes(), 4);
        assert!(matches!(
            at.get(2),
            Err(DomTreeError::OutOfRange { kind: "tree", id: 2, len: 2 })
        ));
    }

    #[test]
    fn test_add_empty_tree_grows_in_place() {
        let mut at = AddTree::new();
        let tree = at.add_empty_tree();
        tree.split(0, LtSplit::new(3, 1.0)).unwrap();
        assert_eq!(at.get(0).unwrap().num_nodes(), 3);
        assert_eq!(at.num_features(), 4);
    }

    #[test]
    fn test_predict_sums_leaf_values() {
        let mut at = AddTree::with_base_score(0.5);
        at.add_tree(stump(0, 0.5, 1.0, -1.0));
        at.add_tree(stump(1, 2.0, 10.0, 20.0));

        assert_eq!(at.predict_single(&[0.0, 0.0]).unwrap(), 11.5);
        assert_eq!(at.predict_single(&[1.0, 3.0]).unwrap(), 19.5);
        assert_eq!(
            at.predict(&[vec![0.0, 3.0], vec![0.7, 1.0]]).unwrap(),
            vec![21.5, 9.5]
        );
        assert!(at.predict_single(&[0.0]).is_err());
    }

    #[test]
    fn test_get_splits_merges_trees() {
        let mut at = AddTree::new();
        at.add_tree(stump(0, 0.5, 1.0, -1.0));
        at.add_tree(stump(0, 0.25, 1.0, -1.0));
        at.add_tree(stump(0, 0.5, 2.0, -2.0));
        at.add_tree(stump(2, -1.0, 2.0, -2.0));

        let splits = at.get_splits();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[&0], vec![0.25, 0.5]);
        assert_eq!(splits[&2], vec![-1.0]);
        assert_eq!(at.num_features(), 3);
    }
}
