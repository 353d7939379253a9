//! JSON encoding of trees and ensembles.
//!
//! A tree is encoded as `{"nodes": [...]}` with one entry per node:
//! internal nodes carry `id, feature_id, threshold, left_id, right_id`,
//! leaves carry `id, value`. Entries may come in any order; ids are kept
//! exactly. An ensemble is `{"base_score": b, "trees": [...]}`; a bare array
//! of trees is also accepted and decodes with a base score of zero.

use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use super::addtree::AddTree;
use super::arena::Tree;
use super::node::{Node, NodeId, NodeKind};
use super::split::{FeatId, LtSplit};
use crate::domain::FloatT;
use crate::error::Result;

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeRepr<V> {
    Internal {
        id: NodeId,
        feature_id: FeatId,
        threshold: FloatT,
        left_id: NodeId,
        right_id: NodeId,
    },
    Leaf {
        id: NodeId,
        value: V,
    },
}

impl<V> NodeRepr<V> {
    fn id(&self) -> NodeId {
        match self {
            NodeRepr::Internal { id, .. } | NodeRepr::Leaf { id, .. } => *id,
        }
    }
}

#[derive(Serialize)]
struct TreeReprRef<'a, V> {
    nodes: Vec<NodeReprRef<'a, V>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum NodeReprRef<'a, V> {
    Internal {
        id: NodeId,
        feature_id: FeatId,
        threshold: FloatT,
        left_id: NodeId,
        right_id: NodeId,
    },
    Leaf {
        id: NodeId,
        value: &'a V,
    },
}

#[derive(Deserialize)]
struct TreeRepr<V> {
    nodes: Vec<NodeRepr<V>>,
}

/// Rebuilds the arena from decoded entries, checking that they form a single
/// tree rooted at id 0.
fn build_tree<V>(entries: Vec<NodeRepr<V>>) -> std::result::Result<Tree<V>, String> {
    let n = entries.len();
    if n == 0 {
        return Err("tree has no nodes".to_string());
    }

    let mut slots: Vec<Option<NodeKind<V>>> = (0..n).map(|_| None).collect();
    let mut parents: Vec<Option<NodeId>> = vec![None; n];

    for entry in entries {
        let id = entry.id();
        if id >= n {
            return Err(format!("node id {id} out of range for {n} nodes"));
        }
        if slots[id].is_some() {
            return Err(format!("duplicate node id {id}"));
        }
        let kind = match entry {
            NodeRepr::Leaf { value, .. } => NodeKind::Leaf { value },
            NodeRepr::Internal {
                feature_id,
                threshold,
                left_id,
                right_id,
                ..
            } => {
                for child in [left_id, right_id] {
                    if child >= n || child == 0 || child == id {
                        return Err(format!("node {id} has invalid child {child}"));
                    }
                    if parents[child].replace(id).is_some() {
                        return Err(format!("node {child} has more than one parent"));
                    }
                }
                NodeKind::Internal {
                    split: LtSplit::new(feature_id, threshold),
                    left: left_id,
                    right: right_id,
                }
            }
        };
        slots[id] = Some(kind);
    }

    // Every slot is filled: n entries, unique ids, all below n.
    let mut nodes = Vec::with_capacity(n);
    for (kind, parent) in slots.into_iter().zip(parents) {
        let kind = kind.ok_or_else(|| "missing node id".to_string())?;
        nodes.push(Node { parent, kind });
    }

    // Unique parents alone still admit detached cycles; all nodes must hang
    // off the root.
    let mut visited = 0;
    let mut stack = vec![0];
    while let Some(id) = stack.pop() {
        visited += 1;
        if let NodeKind::Internal { left, right, .. } = nodes[id].kind {
            stack.push(left);
            stack.push(right);
        }
    }
    if visited != n {
        return Err(format!("{} nodes unreachable from the root", n - visited));
    }

    Ok(Tree::from_nodes(nodes))
}

impl<V: Serialize> Serialize for Tree<V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| match &node.kind {
                NodeKind::Leaf { value } => NodeReprRef::Leaf { id, value },
                NodeKind::Internal { split, left, right } => NodeReprRef::Internal {
                    id,
                    feature_id: split.feat_id,
                    threshold: split.split_value,
                    left_id: *left,
                    right_id: *right,
                },
            })
            .collect();
        TreeReprRef { nodes }.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Tree<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = TreeRepr::<V>::deserialize(deserializer)?;
        build_tree(raw.nodes).map_err(serde::de::Error::custom)
    }
}

impl<V: Serialize> Tree<V> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<V: DeserializeOwned> Tree<V> {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Serialize for AddTree {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("AddTree", 2)?;
        s.serialize_field("base_score", &self.base_score)?;
        s.serialize_field("trees", self.trees())?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for AddTree {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(AddTreeVisitor)
    }
}

/// Accepts `{"base_score", "trees"}` or a bare array of trees, forwarding
/// the inner tree errors unchanged.
struct AddTreeVisitor;

impl<'de> Visitor<'de> for AddTreeVisitor {
    type Value = AddTree;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an ensemble object or an array of trees")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<AddTree, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut at = AddTree::new();
        while let Some(tree) = seq.next_element::<Tree<FloatT>>()? {
            at.add_tree(tree);
        }
        Ok(at)
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<AddTree, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut base_score = None;
        let mut trees = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "base_score" => base_score = Some(map.next_value::<FloatT>()?),
                "trees" => trees = Some(map.next_value::<Vec<Tree<FloatT>>>()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        let trees = trees.ok_or_else(|| <A::Error as de::Error>::missing_field("trees"))?;

        let mut at = AddTree::with_base_score(base_score.unwrap_or_default());
        for tree in trees {
            at.add_tree(tree);
        }
        Ok(at)
    }
}

impl AddTree {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomTreeError;
    use rstest::rstest;

    fn sample_tree() -> Tree<f64> {
        let mut tree = Tree::new(0.0);
        let (l, r) = tree.split(0, LtSplit::new(0, 0.5)).unwrap();
        let (ll, lr) = tree.split(l, LtSplit::new(2, -1.25)).unwrap();
        tree.set_leaf_value(ll, 0.1).unwrap();
        tree.set_leaf_value(lr, 1.0 / 3.0).unwrap();
        tree.set_leaf_value(r, -7.5e-12).unwrap();
        tree
    }

    #[test]
    fn test_encoding_layout() {
        let mut tree = Tree::new(0.0);
        let (l, r) = tree.split(0, LtSplit::new(0, 0.5)).unwrap();
        tree.set_leaf_value(l, 1.0).unwrap();
        tree.set_leaf_value(r, -1.0).unwrap();

        let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"nodes": [
                {"id": 0, "feature_id": 0, "threshold": 0.5, "left_id": 1, "right_id": 2},
                {"id": 1, "value": 1.0},
                {"id": 2, "value": -1.0},
            ]})
        );
    }

    #[test]
    fn test_tree_round_trip_is_exact() {
        let tree = sample_tree();
        let decoded = Tree::<f64>::from_json(&tree.to_json().unwrap()).unwrap();
        assert_eq!(decoded, tree);
        assert_eq!(decoded.num_nodes(), 5);
        assert_eq!(decoded.node(4).unwrap().parent().unwrap().id(), 1);
    }

    #[test]
    fn test_decode_accepts_any_entry_order() {
        let json = r#"{"nodes": [
            {"id": 2, "value": -1.0},
            {"id": 0, "feature_id": 1, "threshold": 3.0, "left_id": 2, "right_id": 1},
            {"id": 1, "value": 1.0}
        ]}"#;
        let tree = Tree::<f64>::from_json(json).unwrap();
        assert_eq!(tree.root().left().unwrap().id(), 2);
        assert_eq!(*tree.predict_single(&[0.0, 4.0]).unwrap(), 1.0);
    }

    #[rstest]
    #[case::not_json("nodes")]
    #[case::empty(r#"{"nodes": []}"#)]
    #[case::missing_field(r#"{"nodes": [{"id": 0}]}"#)]
    #[case::id_gap(r#"{"nodes": [{"id": 0, "value": 1.0}, {"id": 2, "value": 1.0}]}"#)]
    #[case::duplicate_id(r#"{"nodes": [{"id": 0, "value": 1.0}, {"id": 0, "value": 1.0}]}"#)]
    #[case::dangling_child(
        r#"{"nodes": [{"id": 0, "feature_id": 0, "threshold": 1.0, "left_id": 1, "right_id": 5},
                      {"id": 1, "value": 1.0}, {"id": 2, "value": 1.0}]}"#
    )]
    #[case::shared_child(
        r#"{"nodes": [{"id": 0, "feature_id": 0, "threshold": 1.0, "left_id": 1, "right_id": 1},
                      {"id": 1, "value": 1.0}, {"id": 2, "value": 1.0}]}"#
    )]
    #[case::root_as_child(
        r#"{"nodes": [{"id": 0, "feature_id": 0, "threshold": 1.0, "left_id": 1, "right_id": 0},
                      {"id": 1, "value": 1.0}]}"#
    )]
    #[case::detached_cycle(
        r#"{"nodes": [{"id": 0, "value": 1.0},
                      {"id": 1, "feature_id": 0, "threshold": 1.0, "left_id": 2, "right_id": 3},
                      {"id": 2, "feature_id": 0, "threshold": 1.0, "left_id": 1, "right_id": 4},
                      {"id": 3, "value": 1.0}, {"id": 4, "value": 1.0}]}"#
    )]
    fn test_malformed_encodings(#[case] json: &str) {
        assert!(matches!(
            Tree::<f64>::from_json(json),
            Err(DomTreeError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_addtree_round_trip() {
        let mut at = AddTree::with_base_score(0.5);
        at.add_tree(sample_tree());
        at.add_tree(Tree::new(2.0));

        let decoded = AddTree::from_json(&at.to_json().unwrap()).unwrap();
        assert_eq!(decoded, at);
    }

    #[test]
    fn test_validation_error_reported_once() {
        let json = r#"{"nodes": [{"id": 0, "value": 1.0}, {"id": 0, "value": 1.0}]}"#;
        let err = Tree::<f64>::from_json(json).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("malformed encoding: duplicate node id 0"), "{msg}");
        assert_eq!(msg.matches("malformed encoding").count(), 1);
    }

    #[rstest]
    #[case::object(r#"{"base_score": 0.5, "trees": [{"nodes": [{"id": 0, "value": 1.0}, {"id": 0, "value": 1.0}]}]}"#)]
    #[case::bare(r#"[{"nodes": [{"id": 0, "value": 1.0}, {"id": 0, "value": 1.0}]}]"#)]
    fn test_addtree_keeps_inner_tree_error(#[case] json: &str) {
        let msg = AddTree::from_json(json).unwrap_err().to_string();
        assert!(msg.contains("duplicate node id 0"), "{msg}");
    }

    #[rstest]
    #[case::missing_trees(r#"{"base_score": 0.5}"#)]
    #[case::scalar("1.0")]
    fn test_addtree_rejects_other_shapes(#[case] json: &str) {
        assert!(matches!(
            AddTree::from_json(json),
            Err(DomTreeError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_addtree_defaults_base_score_and_ignores_unknown_keys() {
        let json = r#"{"trees": [{"nodes": [{"id": 0, "value": 2.0}]}], "version": 3}"#;
        let at = AddTree::from_json(json).unwrap();
        assert_eq!(at.base_score, 0.0);
        assert_eq!(at.predict_single(&[]).unwrap(), 2.0);
    }

    #[test]
    fn test_addtree_accepts_bare_array() {
        let json = format!("[{}]", sample_tree().to_json().unwrap());
        let at = AddTree::from_json(&json).unwrap();
        assert_eq!(at.size(), 1);
        assert_eq!(at.base_score, 0.0);
    }
}
