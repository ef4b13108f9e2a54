//! Successor chain maintenance.
//!
//! Every node links to the node holding the next-greater keys. Only leaves
//! are ever attached or detached, so each update touches the new leaf, its
//! parent, and at most one further ancestor: the node whose successor the
//! leaf takes over (on attach) or gives back (on detach).

use super::TTree;
use crate::alloc::NodeId;
use crate::node::Side;

impl<T, K: ?Sized> TTree<T, K> {
    /// Thread a freshly attached leaf into the chain.
    pub(super) fn link_successor(&mut self, leaf: NodeId) {
        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };

        match self.nodes[leaf].side {
            Side::Right => {
                // Slots in directly after the parent.
                self.nodes[leaf].successor = self.nodes[parent].successor;
                self.nodes[parent].successor = Some(leaf);
            }
            Side::Left => {
                // Slots in directly before the parent; whoever preceded the
                // parent now precedes the leaf.
                self.nodes[leaf].successor = Some(parent);
                match self.nodes[parent].side {
                    Side::Right => {
                        if let Some(grandparent) = self.nodes[parent].parent {
                            self.nodes[grandparent].successor = Some(leaf);
                        }
                    }
                    Side::Left => {
                        self.redirect_successor(self.nodes[parent].parent, parent, leaf);
                    }
                    Side::Root => {}
                }
            }
            Side::Root => {}
        }
    }

    /// Remove a detached leaf from the chain. The leaf's `parent` and
    /// `side` must still describe where it was attached.
    pub(super) fn unlink_successor(&mut self, leaf: NodeId) {
        let Some(parent) = self.nodes[leaf].parent else {
            return;
        };

        match self.nodes[leaf].side {
            Side::Right => {
                self.nodes[parent].successor = self.nodes[leaf].successor;
            }
            Side::Left => match self.nodes[parent].side {
                Side::Right => {
                    if let Some(grandparent) = self.nodes[parent].parent {
                        self.nodes[grandparent].successor = Some(parent);
                    }
                }
                Side::Left | Side::Root => {
                    self.redirect_successor(Some(parent), leaf, parent);
                }
            },
            Side::Root => {}
        }
    }

    /// Starting at `from` and walking up, find the first ancestor whose
    /// successor is `old` and point it at `new`.
    fn redirect_successor(&mut self, from: Option<NodeId>, old: NodeId, new: NodeId) {
        let mut next: Option<NodeId> = from;
        while let Some(id) = next {
            if self.nodes[id].successor == Some(old) {
                self.nodes[id].successor = Some(new);
                return;
            }
            next = self.nodes[id].parent;
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use crate::{TTree, TreeConfig};

    /// Capacity 2 makes nearly every insert attach a node, exercising each
    /// attach case.
    #[test]
    fn test_chain_survives_mixed_inserts() {
        let mut tree: TTree<u32> = TTree::with_ord_config(TreeConfig::new(2, true)).unwrap();
        let mut seed: u32 = 17;
        for _ in 0..400 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345) % 10_007;
            let _ = tree.insert(seed);
            tree.check_successor_chain().unwrap();
        }
    }

    #[test]
    fn test_chain_survives_deletes() {
        let mut tree: TTree<u32> = TTree::with_ord_config(TreeConfig::new(2, true)).unwrap();
        for i in 0..300 {
            tree.insert(i).unwrap();
        }
        for i in (0..300).step_by(3).chain((1..300).step_by(3)) {
            assert_eq!(tree.delete(&i), Some(i));
            tree.check_successor_chain().unwrap();
        }
        assert_eq!(tree.len(), 100);
    }
}
