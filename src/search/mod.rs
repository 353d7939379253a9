//! Domain-tree construction over an additive tree ensemble.
//!
//! A [`SearchSpace`] partitions a hyper-rectangle of the feature space into
//! smaller boxes so that downstream verification can treat each box
//! separately, without enumerating leaf combinations across all trees.
//!
//! The refinement loop is driven by two pluggable policies:
//! - a [`Measure`] scoring each candidate split of a leaf
//!   ([`UnreachableNodesMeasure`] counts ensemble nodes that the split makes
//!   unreachable);
//! - a [`StopCond`] deciding when to halt
//!   ([`NumDomTreeLeafsStopCond`] bounds the number of leaves).
//!
//! # Module Structure
//!
//! - `leaf_info` - domain-tree leaf payload
//! - `measure` - scoring trait and the unreachable-nodes measure
//! - `stop` - halting trait and the leaf-count condition
//! - `space` - the search space and its refinement loop

mod leaf_info;
mod measure;
mod space;
mod stop;


pub use leaf_info::{DomTree, LeafInfo};
pub use measure::{Direction, Measure, UnreachableNodesMeasure};
pub use space::{SearchSpace, SplitMap};
pub use stop::{NumDomTreeLeafsStopCond, StopCond};
