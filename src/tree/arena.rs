//! Arena-indexed binary tree with threshold splits and generic leaf payloads.

use std::collections::BTreeMap;
use std::fmt::Display;

use tracing::instrument;

use super::node::{Node, NodeId, NodeKind, NodeRef};
use super::split::{FeatId, LtSplit};
use crate::domain::FloatT;
use crate::error::{DomTreeError, Result};

/// Binary decision tree stored as a growable arena of nodes.
///
/// The root is always node `0`. Trees only grow by [`split`](Tree::split)ting
/// a leaf, which appends two new leaves; ids are never reused or renumbered,
/// so ids obtained earlier stay valid for the lifetime of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<V> {
    pub(crate) nodes: Vec<Node<V>>,
}

impl<V> Tree<V> {
    /// Creates a tree with a single root leaf holding `root_value`.
    pub fn new(root_value: V) -> Self {
        Self {
            nodes: vec![Node::leaf(None, root_value)],
        }
    }

    /// Wraps an already validated arena.
    pub(crate) fn from_nodes(nodes: Vec<Node<V>>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leafs(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn root(&self) -> NodeRef<'_, V> {
        NodeRef::new(self, 0)
    }

    /// Returns an accessor for `id`, or [`DomTreeError::OutOfRange`].
    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_, V>> {
        self.check_id(id)?;
        Ok(NodeRef::new(self, id))
    }

    /// Iterates all nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_, V>> + '_ {
        (0..self.nodes.len()).map(move |id| NodeRef::new(self, id))
    }

    /// Leaf ids in left-to-right order.
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        let mut leafs = Vec::new();
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            match self.nodes[id].kind {
                NodeKind::Leaf { .. } => leafs.push(id),
                NodeKind::Internal { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        leafs
    }

    /// Replaces the value stored in leaf `id`.
    pub fn set_leaf_value(&mut self, id: NodeId, value: V) -> Result<()> {
        *self.leaf_value_mut(id)? = value;
        Ok(())
    }

    pub fn leaf_value_mut(&mut self, id: NodeId) -> Result<&mut V> {
        self.check_id(id)?;
        match &mut self.nodes[id].kind {
            NodeKind::Leaf { value } => Ok(value),
            NodeKind::Internal { .. } => Err(DomTreeError::InvalidOperation {
                node: id,
                reason: "internal node has no leaf value",
            }),
        }
    }

    /// Turns leaf `id` into an internal node with `split`.
    ///
    /// Two new leaves are appended (left first) and both start with a copy of
    /// the old leaf's value. Returns `(left_id, right_id)`.
    #[instrument(level = "trace", skip(self))]
    pub fn split(&mut self, id: NodeId, split: LtSplit) -> Result<(NodeId, NodeId)>
    where
        V: Clone,
    {
        self.check_id(id)?;
        let value = match &self.nodes[id].kind {
            NodeKind::Leaf { value } => value.clone(),
            NodeKind::Internal { .. } => {
                return Err(DomTreeError::InvalidOperation {
                    node: id,
                    reason: "cannot split an internal node",
                })
            }
        };

        let left = self.nodes.len();
        let right = left + 1;
        self.nodes.push(Node::leaf(Some(id), value.clone()));
        self.nodes.push(Node::leaf(Some(id), value));
        self.nodes[id].kind = NodeKind::Internal { split, left, right };
        Ok((left, right))
    }

    /// Sorted, deduplicated thresholds per feature over all internal nodes.
    pub fn get_splits(&self) -> BTreeMap<FeatId, Vec<FloatT>> {
        let mut splits: BTreeMap<FeatId, Vec<FloatT>> = BTreeMap::new();
        self.collect_splits(&mut splits);
        for values in splits.values_mut() {
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();
        }
        splits
    }

    pub(crate) fn collect_splits(&self, splits: &mut BTreeMap<FeatId, Vec<FloatT>>) {
        for node in &self.nodes {
            if let NodeKind::Internal { split, .. } = node.kind {
                splits.entry(split.feat_id).or_default().push(split.split_value);
            }
        }
    }

    /// Highest feature id used by any split, `None` for a single leaf.
    pub fn max_feature_id(&self) -> Option<FeatId> {
        self.nodes
            .iter()
            .filter_map(|n| match n.kind {
                NodeKind::Internal { split, .. } => Some(split.feat_id),
                NodeKind::Leaf { .. } => None,
            })
            .max()
    }

    /// Follows `example` from the root and returns the id of the leaf reached.
    pub fn predict_leaf(&self, example: &[FloatT]) -> Result<NodeId> {
        let mut id = 0;
        loop {
            match self.nodes[id].kind {
                NodeKind::Leaf { .. } => return Ok(id),
                NodeKind::Internal { split, left, right } => {
                    let value = example
                        .get(split.feat_id)
                        .copied()
                        .ok_or_else(|| {
                            DomTreeError::feature_out_of_range(split.feat_id, example.len())
                        })?;
                    id = if split.test(value) { left } else { right };
                }
            }
        }
    }

    /// Leaf value reached by `example`.
    pub fn predict_single(&self, example: &[FloatT]) -> Result<&V> {
        let leaf = self.predict_leaf(example)?;
        NodeRef::new(self, leaf).leaf_value()
    }

    /// Split and children of internal node `id`, `None` for a leaf.
    /// Caller guarantees `id` is in range.
    pub(crate) fn internal(&self, id: NodeId) -> Option<(LtSplit, NodeId, NodeId)> {
        match self.nodes[id].kind {
            NodeKind::Internal { split, left, right } => Some((split, left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }

    fn check_id(&self, id: NodeId) -> Result<()> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(DomTreeError::node_out_of_range(id, self.nodes.len()))
        }
    }
}

impl<V: Default> Default for Tree<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: Display> Display for Tree<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tree({} nodes)", self.num_nodes())?;
        let mut stack = vec![(0, 0)];
        while let Some((id, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match &self.nodes[id].kind {
                NodeKind::Leaf { value } => writeln!(f, "{indent}└─ {id}: leaf {value}")?,
                NodeKind::Internal { split, left, right } => {
                    writeln!(f, "{indent}└─ {id}: {split}")?;
                    stack.push((*right, depth + 1));
                    stack.push((*left, depth + 1));
                }
            }
        }
        Ok(())
    }
}
