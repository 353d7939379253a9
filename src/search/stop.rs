//! Halting policies for domain-tree construction.

use super::space::SearchSpace;

/// Decides, once per refinement step, whether construction should halt.
///
/// Closures `FnMut(&SearchSpace) -> bool` are stop conditions. There is no
/// other cancellation mechanism: a condition that should respect a wall-clock
/// budget has to check the deadline itself.
pub trait StopCond {
    fn should_stop(&mut self, space: &SearchSpace) -> bool;
}

impl<F> StopCond for F
where
    F: FnMut(&SearchSpace) -> bool,
{
    fn should_stop(&mut self, space: &SearchSpace) -> bool {
        self(space)
    }
}

/// Halts once the domain tree has at least `max_num_leafs` leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumDomTreeLeafsStopCond {
    pub max_num_leafs: usize,
}

impl NumDomTreeLeafsStopCond {
    pub const fn new(max_num_leafs: usize) -> Self {
        Self { max_num_leafs }
    }
}

impl Default for NumDomTreeLeafsStopCond {
    fn default() -> Self {
        Self::new(16)
    }
}

impl StopCond for NumDomTreeLeafsStopCond {
    fn should_stop(&mut self, space: &SearchSpace) -> bool {
        space.leafs().len() >= self.max_num_leafs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::AddTree;
    use std::sync::Arc;

    #[test]
    fn test_num_leafs_stop_cond() {
        let space = SearchSpace::new(Arc::new(AddTree::new()));
        assert!(NumDomTreeLeafsStopCond::new(1).should_stop(&space));
        assert!(NumDomTreeLeafsStopCond::new(0).should_stop(&space));
        assert!(!NumDomTreeLeafsStopCond::new(2).should_stop(&space));
        assert_eq!(NumDomTreeLeafsStopCond::default().max_num_leafs, 16);
    }

    #[test]
    fn test_closure_is_a_stop_cond() {
        let space = SearchSpace::new(Arc::new(AddTree::new()));
        let mut checks = 0;
        let mut cond = |_: &SearchSpace| {
            checks += 1;
            checks > 2
        };
        assert!(!cond.should_stop(&space));
        assert!(!cond.should_stop(&space));
        assert!(cond.should_stop(&space));
    }
}
