//! Arena-indexed decision trees and additive ensembles.
//!
//! [`Tree<V>`] is shared by the ensemble trees (`V = f64` leaf values) and by
//! the domain tree a [`SearchSpace`](crate::search::SearchSpace) grows
//! (`V = LeafInfo`).

mod addtree;
mod arena;
mod json;
mod node;
mod split;

pub use addtree::AddTree;
pub use arena::Tree;
pub use node::{NodeId, NodeRef};
pub use split::{FeatId, LtSplit};
