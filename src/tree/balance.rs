//! Filepath: src/tree/balance.rs
//!
//! Height balancing.
//!
//! Every node stores `height(right) - height(left)` in `[-1, 1]`. Attaching
//! or detaching a leaf walks the balance change up the tree; a node that
//! reaches +/-2 is repaired with a single or double rotation.
//!
//! ## T-tree key migration
//!
//! A double rotation can lift a one-key leaf to the root of a subtree whose
//! children are both leaves. Such a subtree would keep three nodes around
//! very few keys, so the promoted node absorbs all but one key of its more
//! populated child:
//!
//! ```text
//!        [b]                   [b c d]
//!       /   \        ->        /     \
//!    [a]     [c d e]        [a]      [e]
//! ```
//!
//! The donor keeps its extreme key (the one farthest from the new root) at
//! the first-node slot. The promoted key moves to slot 0 (right donor) or
//! the last slot (left donor) so the absorbed keys land in order after it.

use super::TTree;
use crate::alloc::NodeId;
use crate::cursor::Cursor;
use crate::node::{Node, Side};
use crate::tracing_helpers::{debug_log, trace_log};

impl<T, K: ?Sized> TTree<T, K> {
    // ========================================================================
    //  Fixups
    // ========================================================================

    /// Propagate the height change of a newly attached leaf.
    ///
    /// `cursor` addresses the freshly inserted key and follows it if key
    /// migration moves it.
    pub(super) fn fixup_after_insertion(&mut self, leaf: NodeId, cursor: &mut Cursor) {
        self.link_successor(leaf);

        let mut delta: i8 = self.nodes[leaf].side.balance_delta();
        let mut current: NodeId = leaf;

        while let Some(parent) = self.nodes[current].parent {
            let node: &mut Node = &mut self.nodes[parent];
            node.balance += delta;

            if node.balance == 0 {
                return;
            }
            if node.balance.abs() > 1 {
                self.rebalance(parent, Some(cursor));
                return;
            }

            delta = node.side.balance_delta();
            current = parent;
        }
    }

    /// Propagate the height change of a leaf that was just detached from
    /// its parent. The leaf itself is freed by the caller afterwards.
    pub(super) fn fixup_after_deletion(&mut self, leaf: NodeId) {
        self.unlink_successor(leaf);

        let mut delta: i8 = self.nodes[leaf].side.balance_delta();
        let mut next: Option<NodeId> = self.nodes[leaf].parent;

        while let Some(id) = next {
            let node: &mut Node = &mut self.nodes[id];
            let previous: i8 = node.balance;
            node.balance -= delta;

            // Was balanced: the other side still holds the height.
            if previous == 0 {
                break;
            }

            delta = node.side.balance_delta();
            let mut subtree: NodeId = id;

            if node.balance.abs() > 1 {
                subtree = self.rebalance(id, None);
                // The rotation left the subtree as tall as before.
                if self.nodes[subtree].balance != 0 {
                    break;
                }
            }

            next = self.nodes[subtree].parent;
        }
    }

    // ========================================================================
    //  Rebalance
    // ========================================================================

    /// Repair a node whose balance reached +/-2 and return the new root of
    /// its subtree.
    fn rebalance(&mut self, node: NodeId, cursor: Option<&mut Cursor>) -> NodeId {
        let balance: i8 = self.nodes[node].balance;
        let heavy: Side = if balance < 0 { Side::Left } else { Side::Right };

        let Some(child) = self.nodes[node].child(heavy) else {
            debug_assert!(false, "heavy side of {node:?} has no child");
            return node;
        };

        let subtree: NodeId = if (balance + self.nodes[child].balance).abs() >= 2 {
            trace_log!(node = ?node, side = ?heavy, "single rotation");
            self.rotate_single(node, heavy)
        } else {
            trace_log!(node = ?node, side = ?heavy, "double rotation");
            let subtree: NodeId = self.rotate_double(node, heavy);
            self.migrate_keys(subtree, cursor);
            subtree
        };

        if self.nodes[subtree].parent.is_none() {
            self.root = Some(subtree);
        }
        subtree
    }

    // ========================================================================
    //  Rotations
    // ========================================================================

    /// Lift the `side` child of `pivot` into its place, relinking parents,
    /// children and sides. Balance factors are left to the caller.
    fn rotate_links(&mut self, pivot: NodeId, side: Side) -> NodeId {
        let opposite: Side = side.opposite();
        let Some(lifted) = self.nodes[pivot].child(side) else {
            debug_assert!(false, "rotation of {pivot:?} toward an empty side");
            return pivot;
        };

        let pivot_side: Side = self.nodes[pivot].side;
        let grandparent: Option<NodeId> = self.nodes[pivot].parent;
        let inner: Option<NodeId> = self.nodes[lifted].child(opposite);

        // The lifted node's inner subtree changes parent.
        self.nodes[pivot].set_child(side, inner);
        if let Some(inner) = inner {
            let node: &mut Node = &mut self.nodes[inner];
            node.parent = Some(pivot);
            node.side = side;
        }

        let pivot_node: &mut Node = &mut self.nodes[pivot];
        pivot_node.parent = Some(lifted);
        pivot_node.side = opposite;

        let lifted_node: &mut Node = &mut self.nodes[lifted];
        lifted_node.set_child(opposite, Some(pivot));
        lifted_node.parent = grandparent;
        lifted_node.side = pivot_side;

        if let Some(grandparent) = grandparent {
            self.nodes[grandparent].set_child(pivot_side, Some(lifted));
        }

        lifted
    }

    /// Single rotation toward the heavy `side`.
    fn rotate_single(&mut self, pivot: NodeId, side: Side) -> NodeId {
        let lifted: NodeId = self.rotate_links(pivot, side);
        let lifted_balance: i8 = self.nodes[lifted].balance;

        let pivot_node: &mut Node = &mut self.nodes[pivot];
        pivot_node.balance = if pivot_node.is_internal() {
            if lifted_balance == side.balance_delta() {
                0
            } else {
                side.balance_delta()
            }
        } else {
            pivot_node.structural_balance()
        };

        self.nodes[lifted].balance += side.opposite().balance_delta();
        lifted
    }

    /// Double rotation: the heavy child's inner child is lifted two levels.
    fn rotate_double(&mut self, pivot: NodeId, side: Side) -> NodeId {
        let opposite: Side = side.opposite();
        let Some(child) = self.nodes[pivot].child(side) else {
            debug_assert!(false, "double rotation of {pivot:?} toward an empty side");
            return pivot;
        };

        let lifted: NodeId = self.rotate_links(child, opposite);
        let lifted_balance: i8 = self.nodes[lifted].balance;

        let child_node: &mut Node = &mut self.nodes[child];
        child_node.balance = if child_node.is_internal() {
            if lifted_balance == opposite.balance_delta() {
                side.balance_delta()
            } else {
                0
            }
        } else {
            child_node.structural_balance()
        };

        let top: NodeId = self.rotate_links(pivot, side);
        debug_assert_eq!(top, lifted);

        let pivot_node: &mut Node = &mut self.nodes[pivot];
        pivot_node.balance = if pivot_node.is_internal() {
            if lifted_balance == side.balance_delta() {
                opposite.balance_delta()
            } else {
                0
            }
        } else {
            pivot_node.structural_balance()
        };

        self.nodes[lifted].balance = 0;
        lifted
    }

    // ========================================================================
    //  Key migration
    // ========================================================================

    /// Refill a one-key subtree root whose children are both non-internal
    /// from the more populated child.
    fn migrate_keys(&mut self, top: NodeId, cursor: Option<&mut Cursor>) {
        let node: &Node = &self.nodes[top];
        if node.num_keys() != 1 {
            return;
        }
        let (Some(left), Some(right)) = (node.left, node.right) else {
            return;
        };
        if self.nodes[left].is_internal() || self.nodes[right].is_internal() {
            return;
        }

        if self.nodes[right].num_keys() >= self.nodes[left].num_keys() {
            self.absorb_from_right(top, right, cursor);
        } else {
            self.absorb_from_left(top, left, cursor);
        }
    }

    /// Take every key of `donor` except its maximum. The subtree root's own
    /// key moves to slot 0 with the absorbed keys following it.
    fn absorb_from_right(&mut self, top: NodeId, donor: NodeId, cursor: Option<&mut Cursor>) {
        let first: usize = self.config.first_slot();
        let (node, donor_node) = self.nodes.pair_mut(top, donor);

        let moved: usize = donor_node.num_keys() - 1;
        let own = node.min_key();
        node.keys[0] = own;
        node.keys[1..=moved].copy_from_slice(&donor_node.keys[donor_node.start..donor_node.start + moved]);
        node.start = 0;
        node.end = moved + 1;

        if let Some(cursor) = cursor {
            if cursor.node == Some(top) {
                cursor.idx = 0;
            } else if cursor.node == Some(donor) {
                if cursor.idx < donor_node.max_idx() {
                    cursor.node = Some(top);
                    cursor.idx = cursor.idx - donor_node.start + 1;
                } else {
                    cursor.idx = first;
                }
            }
        }

        let kept = donor_node.max_key();
        donor_node.collapse_to(first, kept);

        debug_log!(node = ?top, donor = ?donor, moved, "absorbed keys from right child");
    }

    /// Take every key of `donor` except its minimum. The subtree root's own
    /// key moves to the last slot with the absorbed keys preceding it.
    fn absorb_from_left(&mut self, top: NodeId, donor: NodeId, cursor: Option<&mut Cursor>) {
        let first: usize = self.config.first_slot();
        let capacity: usize = self.config.keys_per_node;
        let (node, donor_node) = self.nodes.pair_mut(top, donor);

        let moved: usize = donor_node.num_keys() - 1;
        let own = node.min_key();
        let start: usize = capacity - 1 - moved;
        node.keys[capacity - 1] = own;
        node.keys[start..capacity - 1].copy_from_slice(&donor_node.keys[donor_node.start + 1..donor_node.end]);
        node.start = start;
        node.end = capacity;

        if let Some(cursor) = cursor {
            if cursor.node == Some(top) {
                cursor.idx = capacity - 1;
            } else if cursor.node == Some(donor) {
                if cursor.idx > donor_node.min_idx() {
                    cursor.node = Some(top);
                    cursor.idx = start + (cursor.idx - donor_node.start - 1);
                } else {
                    cursor.idx = first;
                }
            }
        }

        let kept = donor_node.min_key();
        donor_node.collapse_to(first, kept);

        debug_log!(node = ?top, donor = ?donor, moved, "absorbed keys from left child");
    }
}

// ============================================================================
//  Tests
// ============================================================================
