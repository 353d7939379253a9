//! Import from XGBoost JSON tree dumps (`Booster::get_dump(dump_format="json")`).
//!
//! Each dump describes one tree as nested objects:
//!
//! ```json
//! {"nodeid":0,"split":"f2","split_condition":0.5,"yes":1,"no":2,"missing":1,
//!  "children":[{"nodeid":1,"leaf":0.1},{"nodeid":2,"leaf":-0.2}]}
//! ```
//!
//! XGBoost sends `x < split_condition` to `yes`, which matches [`LtSplit`]'s
//! left branch. Missing-value routing is not represented.

use serde::Deserialize;
use tracing::debug;

use crate::domain::FloatT;
use crate::error::{DomTreeError, Result};
use crate::tree::{AddTree, FeatId, LtSplit, NodeId, Tree};

/// Settings for [`addtree_from_xgb_dump`].
#[derive(Debug, Clone, PartialEq)]
pub struct XgbImportConfig {
    /// Constant added to every prediction.
    pub base_score: FloatT,
    /// Prefix of feature names in `split`, followed by the feature id.
    pub feature_prefix: String,
}

impl Default for XgbImportConfig {
    fn default() -> Self {
        Self {
            base_score: 0.5,
            feature_prefix: "f".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpNode {
    Split {
        #[serde(default)]
        nodeid: Option<u64>,
        split: String,
        split_condition: FloatT,
        #[serde(default)]
        yes: Option<u64>,
        children: Vec<DumpNode>,
    },
    Leaf {
        #[serde(default)]
        nodeid: Option<u64>,
        leaf: FloatT,
    },
}

impl DumpNode {
    fn nodeid(&self) -> Option<u64> {
        match self {
            DumpNode::Split { nodeid, .. } | DumpNode::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

/// Builds an ensemble from one JSON dump per tree.
pub fn addtree_from_xgb_dump<'a, I>(dumps: I, config: &XgbImportConfig) -> Result<AddTree>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut addtree = AddTree::with_base_score(config.base_score);
    for (index, dump) in dumps.into_iter().enumerate() {
        let root: DumpNode = serde_json::from_str(dump)
            .map_err(|e| DomTreeError::malformed(format!("tree {index}: {e}")))?;
        let tree = parse_tree(&root, &config.feature_prefix)
            .map_err(|e| DomTreeError::malformed(format!("tree {index}: {e}")))?;
        addtree.add_tree(tree);
    }

    debug!(
        num_trees = addtree.len(),
        num_nodes = addtree.num_nodes(),
        base_score = addtree.base_score,
        "imported xgboost dump"
    );
    Ok(addtree)
}

fn parse_tree(root: &DumpNode, prefix: &str) -> std::result::Result<Tree<FloatT>, String> {
    let mut tree = Tree::new(0.0);
    let mut stack: Vec<(NodeId, &DumpNode)> = vec![(0, root)];

    while let Some((id, node)) = stack.pop() {
        match node {
            DumpNode::Leaf { leaf, .. } => {
                tree.set_leaf_value(id, *leaf).map_err(|e| e.to_string())?;
            }
            DumpNode::Split {
                split,
                split_condition,
                yes,
                children,
                ..
            } => {
                let feat_id = parse_feature(split, prefix)?;
                let (left_dump, right_dump) = order_children(children, *yes)?;
                let (left, right) = tree
                    .split(id, LtSplit::new(feat_id, *split_condition))
                    .map_err(|e| e.to_string())?;
                stack.push((right, right_dump));
                stack.push((left, left_dump));
            }
        }
    }

    Ok(tree)
}

fn parse_feature(split: &str, prefix: &str) -> std::result::Result<FeatId, String> {
    split
        .strip_prefix(prefix)
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| format!("feature `{split}` is not `{prefix}<id>`"))
}

/// `(left, right)` children; the `yes` child goes left when node ids are
/// present, otherwise the dump order is taken as is.
fn order_children(
    children: &[DumpNode],
    yes: Option<u64>,
) -> std::result::Result<(&DumpNode, &DumpNode), String> {
    let [first, second] = children else {
        return Err(format!("split node has {} children, expected 2", children.len()));
    };
    match (yes, second.nodeid()) {
        (Some(yes), Some(id)) if yes == id => Ok((second, first)),
        _ => Ok((first, second)),
    }
}
