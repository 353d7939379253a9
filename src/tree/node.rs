//! Arena node storage and the borrowed [`NodeRef`] accessor.

use super::split::LtSplit;
use super::Tree;
use crate::error::{DomTreeError, Result};

/// Stable index of a node inside one [`Tree`]'s arena.
pub type NodeId = usize;

/// Payload of an arena slot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind<V> {
    Leaf {
        value: V,
    },
    Internal {
        split: LtSplit,
        left: NodeId,
        right: NodeId,
    },
}

/// Arena slot: node kind plus the parent relation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node<V> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind<V>,
}

impl<V> Node<V> {
    pub(crate) fn leaf(parent: Option<NodeId>, value: V) -> Self {
        Self {
            parent,
            kind: NodeKind::Leaf { value },
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Non-owning view of one node of a [`Tree`].
///
/// Borrowing ties the view to the tree: it cannot outlive it, and the tree
/// cannot be mutated while a `NodeRef` is alive.
#[derive(Debug)]
pub struct NodeRef<'a, V> {
    tree: &'a Tree<V>,
    id: NodeId,
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> NodeRef<'a, V> {
    /// Caller guarantees `id` is in range.
    pub(crate) fn new(tree: &'a Tree<V>, id: NodeId) -> Self {
        debug_assert!(id < tree.num_nodes());
        Self { tree, id }
    }

    fn node(&self) -> &'a Node<V> {
        &self.tree.nodes[self.id]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a Tree<V> {
        self.tree
    }

    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    pub fn is_internal(&self) -> bool {
        !self.is_leaf()
    }

    pub fn left(&self) -> Result<NodeRef<'a, V>> {
        match self.node().kind {
            NodeKind::Internal { left, .. } => Ok(NodeRef::new(self.tree, left)),
            NodeKind::Leaf { .. } => Err(self.invalid("leaf has no left child")),
        }
    }

    pub fn right(&self) -> Result<NodeRef<'a, V>> {
        match self.node().kind {
            NodeKind::Internal { right, .. } => Ok(NodeRef::new(self.tree, right)),
            NodeKind::Leaf { .. } => Err(self.invalid("leaf has no right child")),
        }
    }

    pub fn parent(&self) -> Result<NodeRef<'a, V>> {
        self.node()
            .parent
            .map(|p| NodeRef::new(self.tree, p))
            .ok_or_else(|| self.invalid("root has no parent"))
    }

    pub fn get_split(&self) -> Result<LtSplit> {
        match self.node().kind {
            NodeKind::Internal { split, .. } => Ok(split),
            NodeKind::Leaf { .. } => Err(self.invalid("leaf has no split")),
        }
    }

    pub fn leaf_value(&self) -> Result<&'a V> {
        match &self.node().kind {
            NodeKind::Leaf { value } => Ok(value),
            NodeKind::Internal { .. } => Err(self.invalid("internal node has no leaf value")),
        }
    }

    /// Number of edges between this node and the root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.node().parent;
        while let Some(p) = current {
            depth += 1;
            current = self.tree.nodes[p].parent;
        }
        depth
    }

    /// Number of nodes in the subtree rooted here, this node included.
    pub fn tree_size(&self) -> usize {
        let mut size = 0;
        let mut stack = vec![self.id];
        while let Some(id) = stack.pop() {
            size += 1;
            if let NodeKind::Internal { left, right, .. } = self.tree.nodes[id].kind {
                stack.push(right);
                stack.push(left);
            }
        }
        size
    }

    fn invalid(&self, reason: &'static str) -> DomTreeError {
        DomTreeError::InvalidOperation {
            node: self.id,
            reason,
        }
    }
}
