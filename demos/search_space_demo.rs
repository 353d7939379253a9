//! Partitioning the input space of a small ensemble into a domain tree.
//!
//! Run with `RUST_LOG=debug` to follow each refinement step.

use std::sync::Arc;

use domtree::{
    AddTree, Domains, LtSplit, NumDomTreeLeafsStopCond, RealDomain, SearchSpace, Tree,
    UnreachableNodesMeasure,
};
use tracing_subscriber::EnvFilter;

fn build_addtree() -> domtree::Result<AddTree> {
    let mut at = AddTree::with_base_score(0.5);

    // X0 < 0.5 ? (X1 < 2 ? 1 : 2) : 3
    let mut t = Tree::new(0.0);
    let (l, r) = t.split(0, LtSplit::new(0, 0.5))?;
    let (ll, lr) = t.split(l, LtSplit::new(1, 2.0))?;
    t.set_leaf_value(ll, 1.0)?;
    t.set_leaf_value(lr, 2.0)?;
    t.set_leaf_value(r, 3.0)?;
    at.add_tree(t);

    // X1 < 1 ? -1 : (X0 < 0.25 ? 0.5 : -0.5)
    let t = at.add_empty_tree();
    let (l, r) = t.split(0, LtSplit::new(1, 1.0))?;
    t.set_leaf_value(l, -1.0)?;
    let (rl, rr) = t.split(r, LtSplit::new(0, 0.25))?;
    t.set_leaf_value(rl, 0.5)?;
    t.set_leaf_value(rr, -0.5)?;

    Ok(at)
}

fn main() -> domtree::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addtree = Arc::new(build_addtree()?);
    println!("Ensemble ({} trees, {} nodes):", addtree.len(), addtree.num_nodes());
    for tree in addtree.iter() {
        println!("{tree}");
    }

    let root = Domains::from_vec(vec![RealDomain::new(0.0, 1.0), RealDomain::new(0.0, 4.0)]);
    let mut space = SearchSpace::with_root_domains(Arc::clone(&addtree), root);
    space.split(
        &mut UnreachableNodesMeasure,
        &mut NumDomTreeLeafsStopCond::new(4),
    )?;

    println!("Domain tree:\n{}", space.domtree());
    for (&leaf, score) in space.leafs().iter().zip(space.scores()) {
        println!("  leaf {leaf}: {} (next score {score})", space.leaf_domains(leaf)?);
    }

    println!("JSON: {}", space.domtree().to_json()?);
    Ok(())
}
