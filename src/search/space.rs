//! Incremental partitioning of a hyper-rectangle into a domain tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, instrument};

use super::leaf_info::{DomTree, LeafInfo};
use super::measure::{Direction, Measure};
use super::stop::StopCond;
use crate::domain::{Domains, FloatT};
use crate::error::{DomTreeError, Result};
use crate::tree::{AddTree, FeatId, LtSplit, NodeId, Tree};

/// Candidate thresholds per feature, sorted ascending without duplicates.
pub type SplitMap = BTreeMap<FeatId, Vec<FloatT>>;

/// Domain tree over a shared, read-only ensemble.
///
/// The domain tree starts as one leaf spanning `root_domains`. Each call to
/// [`split`](Self::split) refines leaves until the stop condition holds or no
/// leaf has a candidate threshold left. At all times:
///
/// - a leaf's domains are `root_domains` narrowed by the splits on its path;
/// - the leaves' domains are pairwise disjoint and together cover
///   `root_domains`;
/// - every split threshold comes from [`splits_map`](Self::splits_map), i.e.
///   occurs as a split value for that feature somewhere in the ensemble.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    num_features: usize,
    addtree: Arc<AddTree>,
    domtree: DomTree,
    splits_map: SplitMap,
    leafs: Vec<NodeId>,
    root_domains: Domains,
    leaf_domains: HashMap<NodeId, Domains>,
}

impl SearchSpace {
    /// Search space over the whole feature space.
    pub fn new(addtree: Arc<AddTree>) -> Self {
        Self::with_root_domains(addtree, Domains::default())
    }

    /// Search space restricted to `root_domains`.
    ///
    /// The root domains are padded with unbounded domains up to the number of
    /// features the ensemble uses.
    pub fn with_root_domains(addtree: Arc<AddTree>, mut root_domains: Domains) -> Self {
        let num_features = addtree.num_features().max(root_domains.len());
        root_domains.resize(num_features);
        let splits_map = addtree.get_splits();

        let mut leaf_domains = HashMap::new();
        leaf_domains.insert(0, root_domains.clone());

        Self {
            num_features,
            addtree,
            domtree: Tree::new(LeafInfo::none()),
            splits_map,
            leafs: vec![0],
            root_domains,
            leaf_domains,
        }
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn addtree(&self) -> &AddTree {
        &self.addtree
    }

    /// Handle on the shared ensemble.
    pub fn shared_addtree(&self) -> Arc<AddTree> {
        Arc::clone(&self.addtree)
    }

    pub fn domtree(&self) -> &DomTree {
        &self.domtree
    }

    pub fn splits_map(&self) -> &SplitMap {
        &self.splits_map
    }

    /// Current domain-tree leaves, in increasing id order.
    pub fn leafs(&self) -> &[NodeId] {
        &self.leafs
    }

    /// Best-candidate score of each leaf, aligned with [`leafs`](Self::leafs).
    pub fn scores(&self) -> Vec<f64> {
        self.leafs
            .iter()
            .map(|&id| self.leaf_info(id).score)
            .collect()
    }

    pub fn root_domains(&self) -> &Domains {
        &self.root_domains
    }

    /// Domains of any domain-tree node, internal nodes included.
    pub fn get_domains(&self, node_id: NodeId) -> Result<Domains> {
        let mut path = Vec::new();
        let mut node = self.domtree.node(node_id)?;
        while !node.is_root() {
            let parent = node.parent()?;
            let went_left = parent.left()?.id() == node.id();
            path.push((parent.get_split()?, went_left));
            node = parent;
        }

        let mut domains = self.root_domains.clone();
        for (split, went_left) in path.into_iter().rev() {
            domains.refine(split, went_left);
        }
        Ok(domains)
    }

    /// Cached domains of a current leaf.
    pub fn leaf_domains(&self, node_id: NodeId) -> Result<&Domains> {
        let node = self.domtree.node(node_id)?;
        self.leaf_domains
            .get(&node_id)
            .ok_or(DomTreeError::InvalidOperation {
                node: node.id(),
                reason: "not a domain tree leaf",
            })
    }

    /// Best known refinement of a current leaf.
    pub fn best_split(&self, node_id: NodeId) -> Result<Option<LtSplit>> {
        Ok(self.domtree.node(node_id)?.leaf_value()?.dom_split)
    }

    /// Refines the domain tree until `cond` holds or no leaf can be split.
    ///
    /// Each step splits the single leaf whose cached best candidate scores
    /// best in `measure`'s direction; ties go to the lowest leaf id, and within
    /// a leaf to the lowest feature id and then the lowest threshold. Only the
    /// two new leaves are scored after a split.
    ///
    /// Calling again resumes from the current leaves after re-scoring them
    /// with the new `measure`.
    pub fn split<M, C>(&mut self, measure: &mut M, cond: &mut C) -> Result<()>
    where
        M: Measure + ?Sized,
        C: StopCond + ?Sized,
    {
        debug!(num_leafs = self.leafs.len(), "refining domain tree");
        for leaf in self.leafs.clone() {
            self.compute_best_score(leaf, measure)?;
        }

        loop {
            if cond.should_stop(self) {
                debug!(num_leafs = self.leafs.len(), "stop condition reached");
                break;
            }

            let Some((leaf, split, score)) = self.select_best_leaf(measure.direction()) else {
                debug!(num_leafs = self.leafs.len(), "no candidate splits left");
                break;
            };

            let (left, right) = self.apply_split(leaf, split)?;
            debug!(leaf, %split, score, left, right, "split domain tree leaf");

            self.compute_best_score(left, measure)?;
            self.compute_best_score(right, measure)?;
        }

        Ok(())
    }

    fn leaf_info(&self, leaf: NodeId) -> LeafInfo {
        self.domtree
            .node(leaf)
            .and_then(|n| n.leaf_value().copied())
            .unwrap_or_default()
    }

    /// Scores every candidate threshold strictly inside the leaf's domains and
    /// stores the best one in the leaf.
    #[instrument(level = "trace", skip(self, measure))]
    fn compute_best_score<M>(&mut self, leaf: NodeId, measure: &mut M) -> Result<()>
    where
        M: Measure + ?Sized,
    {
        let direction = measure.direction();
        let domains = self.leaf_domains(leaf)?;

        let mut best: Option<LeafInfo> = None;
        for (&feat_id, thresholds) in &self.splits_map {
            let dom = domains.domain_or_everything(feat_id);
            let start = thresholds.partition_point(|&t| t <= dom.lo());
            let end = thresholds.partition_point(|&t| t < dom.hi());

            for &threshold in thresholds.get(start..end).unwrap_or_default() {
                let split = LtSplit::new(feat_id, threshold);
                let score = measure.score(self, domains, split);
                let improves = best.map_or(true, |b| direction.is_better(score, b.score));
                if improves {
                    best = Some(LeafInfo::new(split, score));
                }
            }
        }

        self.domtree
            .set_leaf_value(leaf, best.unwrap_or_else(LeafInfo::none))
    }

    /// Leaf with the best cached candidate, `None` when no leaf has one.
    ///
    /// `leafs` is in increasing id order and only a strictly better score
    /// replaces the incumbent, so ties keep the lowest leaf id.
    fn select_best_leaf(&self, direction: Direction) -> Option<(NodeId, LtSplit, f64)> {
        let mut best: Option<(NodeId, LtSplit, f64)> = None;
        for &leaf in &self.leafs {
            let info = self.leaf_info(leaf);
            let Some(split) = info.dom_split else {
                continue;
            };
            let improves = best.map_or(true, |(_, _, best_score)| {
                direction.is_better(info.score, best_score)
            });
            if improves {
                best = Some((leaf, split, info.score));
            }
        }
        best
    }

    fn apply_split(&mut self, leaf: NodeId, split: LtSplit) -> Result<(NodeId, NodeId)> {
        let (left, right) = self.domtree.split(leaf, split)?;

        let parent_domains = self.leaf_domains.remove(&leaf).ok_or_else(|| {
            DomTreeError::InvalidOperation {
                node: leaf,
                reason: "not a domain tree leaf",
            }
        })?;
        let mut left_domains = parent_domains.clone();
        left_domains.refine(split, true);
        let mut right_domains = parent_domains;
        right_domains.refine(split, false);
        self.leaf_domains.insert(left, left_domains);
        self.leaf_domains.insert(right, right_domains);

        self.leafs.retain(|&id| id != leaf);
        self.leafs.push(left);
        self.leafs.push(right);
        Ok((left, right))
    }
}
