//! domtree - domain trees over additive tree ensembles
//!
//! Partitions the input space of a gradient-boosted ensemble into disjoint
//! boxes so that each box can be analysed with fewer reachable leaves.
//! Provides the interval and tree primitives, the ensemble container, its
//! JSON encoding, and an XGBoost dump importer.

pub mod compat;
pub mod domain;
pub mod error;
pub mod search;
pub mod tree;

pub use domain::{Domains, FloatT, RealDomain, WhereFlag};
pub use error::{DomTreeError, Result};
pub use search::{
    DomTree, LeafInfo, Measure, NumDomTreeLeafsStopCond, SearchSpace, StopCond,
    UnreachableNodesMeasure,
};
pub use tree::{AddTree, FeatId, LtSplit, NodeId, NodeRef, Tree};
