use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::tree::{LtSplit, Tree};

/// Payload of a domain-tree leaf: its best known refinement and that
/// refinement's score.
///
/// `dom_split` is `None` when no candidate threshold lies strictly inside the
/// leaf's domains; `score` is then `0.0` and carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeafInfo {
    pub dom_split: Option<LtSplit>,
    pub score: f64,
}

impl LeafInfo {
    pub const fn new(dom_split: LtSplit, score: f64) -> Self {
        Self {
            dom_split: Some(dom_split),
            score,
        }
    }

    pub const fn none() -> Self {
        Self {
            dom_split: None,
            score: 0.0,
        }
    }
}

impl Display for LeafInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.dom_split {
            Some(split) => write!(f, "LeafInfo({split}, score {})", self.score),
            None => write!(f, "LeafInfo(no split)"),
        }
    }
}

/// Tree whose leaves partition the analysed hyper-rectangle.
pub type DomTree = Tree<LeafInfo>;
