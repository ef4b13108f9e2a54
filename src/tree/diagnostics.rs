//! Structural inspection and invariant checking.
//!
//! Everything here is read-only. It exists for tests, debugging and
//! tooling that wants to look at node layout: capacity tuning, balance
//! visualisation, checking a tree after a long randomized run.
//!
//! [`TTree::validate`] checks every structural invariant:
//!
//! - parent/child/side links agree and no node is empty;
//! - items are in non-decreasing key order (strictly increasing when the
//!   tree is unique);
//! - every stored balance factor equals the measured height difference and
//!   lies in `[-1, 1]`;
//! - the successor chain visits the nodes in in-order sequence;
//! - the item count matches `len()`.

use std::cmp::Ordering;
use std::error::Error as StdError;
use std::fmt as StdFmt;

use super::TTree;
use crate::alloc::NodeId;
use crate::node::{Node, Side};

// ============================================================================
//  NodeView
// ============================================================================

/// Read-only view of one node.
pub struct NodeView<'a, T, K: ?Sized> {
    tree: &'a TTree<T, K>,
    id: NodeId,
    node: &'a Node,
}

impl<'a, T, K: ?Sized> NodeView<'a, T, K> {
    /// Handle of the viewed node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Position relative to the parent.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.node.side
    }

    /// Stored `height(right) - height(left)`.
    #[must_use]
    pub const fn balance_factor(&self) -> i8 {
        self.node.balance
    }

    /// Keys currently stored.
    #[must_use]
    pub const fn num_keys(&self) -> usize {
        self.node.num_keys()
    }

    /// Key slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.node.capacity()
    }

    /// Slot of the smallest key.
    #[must_use]
    pub const fn min_idx(&self) -> usize {
        self.node.min_idx()
    }

    /// Slot of the greatest key.
    #[must_use]
    pub const fn max_idx(&self) -> usize {
        self.node.max_idx()
    }

    /// Parent handle.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// Left child handle.
    #[must_use]
    pub const fn left(&self) -> Option<NodeId> {
        self.node.left
    }

    /// Right child handle.
    #[must_use]
    pub const fn right(&self) -> Option<NodeId> {
        self.node.right
    }

    /// Node holding the next-greater keys.
    #[must_use]
    pub const fn successor(&self) -> Option<NodeId> {
        self.node.successor
    }

    /// No children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Exactly one child.
    #[must_use]
    pub const fn is_half_leaf(&self) -> bool {
        self.node.is_half_leaf()
    }

    /// Both children.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.node.is_internal()
    }

    /// Item in slot `idx`, if the slot is inside the window.
    #[must_use]
    pub fn item_at(&self, idx: usize) -> Option<&'a T> {
        if !(self.node.start..self.node.end).contains(&idx) {
            return None;
        }
        self.tree.items.get(self.node.key(idx))
    }

    /// Items in ascending order.
    pub fn items(&self) -> impl Iterator<Item = &'a T> + use<'a, T, K> {
        let tree: &'a TTree<T, K> = self.tree;
        let node: &'a Node = self.node;
        node.window().iter().map(move |&item| &tree.items[item])
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &'a K> + use<'a, T, K> {
        let key_of = self.tree.key_of;
        self.items().map(key_of)
    }
}

impl<T, K: ?Sized> Clone for NodeView<'_, T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K: ?Sized> Copy for NodeView<'_, T, K> {}

impl<T, K: ?Sized> StdFmt::Debug for NodeView<'_, T, K> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("NodeView")
            .field("id", &self.id)
            .field("side", &self.node.side)
            .field("keys", &self.node.num_keys())
            .field("window", &(self.node.start..self.node.end))
            .field("balance", &self.node.balance)
            .field("successor", &self.node.successor)
            .finish()
    }
}

// ============================================================================
//  InvariantViolation
// ============================================================================

/// First broken invariant found by a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Subtree heights differ by more than one.
    Unbalanced {
        /// Offending node.
        node: NodeId,
        /// Height of the left subtree.
        left_height: usize,
        /// Height of the right subtree.
        right_height: usize,
    },

    /// The stored balance factor disagrees with the measured heights.
    BalanceMismatch {
        /// Offending node.
        node: NodeId,
        /// Value stored in the node.
        stored: i8,
        /// Value measured from subtree heights.
        measured: i64,
    },

    /// A node without keys is still linked into the tree.
    EmptyNode {
        /// Offending node.
        node: NodeId,
    },

    /// A child's parent or side does not point back at its parent.
    BrokenLink {
        /// Offending child.
        node: NodeId,
    },

    /// Items are out of key order (or equal on a unique tree).
    OutOfOrder {
        /// Node holding the later of the two items.
        node: NodeId,
    },

    /// A successor link does not name the next node in key order.
    BrokenChain {
        /// Node whose successor link is wrong.
        node: NodeId,
    },

    /// The number of reachable items differs from `len()`.
    LengthMismatch {
        /// Items reachable from the root.
        counted: usize,
        /// Value reported by `len()`.
        expected: usize,
    },
}

impl StdFmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::Unbalanced {
                node,
                left_height,
                right_height,
            } => write!(
                f,
                "{node:?} is unbalanced: left height {left_height}, right height {right_height}"
            ),
            Self::BalanceMismatch {
                node,
                stored,
                measured,
            } => write!(f, "{node:?} stores balance {stored} but measures {measured}"),
            Self::EmptyNode { node } => write!(f, "{node:?} holds no keys"),
            Self::BrokenLink { node } => write!(f, "{node:?} disagrees with its parent"),
            Self::OutOfOrder { node } => write!(f, "items out of order in {node:?}"),
            Self::BrokenChain { node } => write!(f, "successor of {node:?} is not the next node"),
            Self::LengthMismatch { counted, expected } => {
                write!(f, "counted {counted} items, expected {expected}")
            }
        }
    }
}

impl StdError for InvariantViolation {}

// ============================================================================
//  Inspection
// ============================================================================

impl<T, K: ?Sized> TTree<T, K> {
    /// Root node handle.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node holding the smallest keys.
    #[must_use]
    pub fn leftmost(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_min(root))
    }

    /// Node holding the greatest keys.
    #[must_use]
    pub fn rightmost(&self) -> Option<NodeId> {
        self.root.map(|root| self.subtree_max(root))
    }

    /// View of a live node, `None` if the handle is stale.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeView<'_, T, K>> {
        self.nodes.get(id).map(|node| NodeView {
            tree: self,
            id,
            node,
        })
    }

    /// Number of live nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Visit every node in pre-order with its depth (root = 0).
    pub fn for_each_node<F>(&self, mut visit: F)
    where
        F: FnMut(NodeView<'_, T, K>, usize),
    {
        let mut stack: Vec<(NodeId, usize)> = self.root.into_iter().map(|root| (root, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let node: &Node = &self.nodes[id];
            if let Some(right) = node.right {
                stack.push((right, depth + 1));
            }
            if let Some(left) = node.left {
                stack.push((left, depth + 1));
            }
            visit(
                NodeView {
                    tree: self,
                    id,
                    node,
                },
                depth,
            );
        }
    }

    /// Edges on the longest root-to-leaf path. Zero for an empty tree or a
    /// lone root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest: usize = 0;
        self.for_each_node(|_, depth| deepest = deepest.max(depth));
        deepest
    }

    // ========================================================================
    //  Checks
    // ========================================================================

    /// Check that every node is height-balanced and stores the right
    /// balance factor.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation::Unbalanced`] or
    /// [`InvariantViolation::BalanceMismatch`] found.
    pub fn check_balance(&self) -> Result<(), InvariantViolation> {
        self.subtree_height(self.root).map(|_| ())
    }

    /// Check that successor links visit the nodes in key order and the
    /// last node has none.
    ///
    /// # Errors
    ///
    /// [`InvariantViolation::BrokenChain`] naming the first bad link.
    pub fn check_successor_chain(&self) -> Result<(), InvariantViolation> {
        let order: Vec<NodeId> = self.in_order_nodes();
        for (i, &id) in order.iter().enumerate() {
            if self.nodes[id].successor != order.get(i + 1).copied() {
                return Err(InvariantViolation::BrokenChain { node: id });
            }
        }
        Ok(())
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let order: Vec<NodeId> = self.in_order_nodes();
        let mut counted: usize = 0;
        let mut previous: Option<&K> = None;

        for &id in &order {
            let node: &Node = &self.nodes[id];
            if node.is_empty() {
                return Err(InvariantViolation::EmptyNode { node: id });
            }
            self.check_links(id, node)?;

            for &item in node.window() {
                let key: &K = self.key_of_item(item);
                if let Some(prev) = previous {
                    match (self.compare)(prev, key) {
                        Ordering::Greater => return Err(InvariantViolation::OutOfOrder { node: id }),
                        Ordering::Equal if self.config.unique => {
                            return Err(InvariantViolation::OutOfOrder { node: id });
                        }
                        _ => {}
                    }
                }
                previous = Some(key);
                counted += 1;
            }
        }

        if counted != self.len() {
            return Err(InvariantViolation::LengthMismatch {
                counted,
                expected: self.len(),
            });
        }

        self.check_balance()?;
        self.check_successor_chain()
    }

    fn check_links(&self, id: NodeId, node: &Node) -> Result<(), InvariantViolation> {
        let linked: bool = match node.parent {
            None => node.side == Side::Root && self.root == Some(id),
            Some(parent) => {
                node.side != Side::Root
                    && self.nodes.get(parent).and_then(|p| p.child(node.side)) == Some(id)
            }
        };
        if linked {
            Ok(())
        } else {
            Err(InvariantViolation::BrokenLink { node: id })
        }
    }

    /// Height in nodes of the subtree at `node`, checking balance on the way.
    fn subtree_height(&self, node: Option<NodeId>) -> Result<usize, InvariantViolation> {
        let Some(id) = node else {
            return Ok(0);
        };
        let n: &Node = &self.nodes[id];
        let left_height: usize = self.subtree_height(n.left)?;
        let right_height: usize = self.subtree_height(n.right)?;

        if left_height.abs_diff(right_height) > 1 {
            return Err(InvariantViolation::Unbalanced {
                node: id,
                left_height,
                right_height,
            });
        }

        let measured: i64 = if right_height >= left_height {
            i64::from(right_height != left_height)
        } else {
            -1
        };
        if i64::from(n.balance) != measured {
            return Err(InvariantViolation::BalanceMismatch {
                node: id,
                stored: n.balance,
                measured,
            });
        }

        Ok(left_height.max(right_height) + 1)
    }

    /// Nodes in key order, found by walking child links only.
    fn in_order_nodes(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = Vec::new();
        let mut current: Option<NodeId> = self.root;

        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id].left;
            }
            if let Some(id) = stack.pop() {
                order.push(id);
                current = self.nodes[id].right;
            }
        }
        order
    }
}

// ============================================================================
//  TreeDump
// ============================================================================

/// Indented text rendering of the node structure.
///
/// One line per node in pre-order: `[*]` marks the root, `[L]`/`[R]` a
/// left/right child, followed by the key count and the keys.
///
/// ```text
/// [*] <2> 30 40 (bf 0)
///   [L] <2> 10 20 (bf 0)
///   [R] <1> 50 (bf 0)
/// ```
pub struct TreeDump<'a, T, K: ?Sized> {
    tree: &'a TTree<T, K>,
}

impl<T, K: ?Sized> TTree<T, K> {
    /// Render the node structure; see [`TreeDump`].
    #[must_use]
    pub const fn dump(&self) -> TreeDump<'_, T, K> {
        TreeDump { tree: self }
    }
}

impl<T, K> StdFmt::Display for TreeDump<'_, T, K>
where
    K: StdFmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        if self.tree.is_empty() {
            return writeln!(f, "(empty)");
        }

        let mut result: StdFmt::Result = Ok(());
        self.tree.for_each_node(|view, depth| {
            if result.is_err() {
                return;
            }
            result = write_node(f, &view, depth);
        });
        result
    }
}

fn write_node<T, K>(
    f: &mut StdFmt::Formatter<'_>,
    view: &NodeView<'_, T, K>,
    depth: usize,
) -> StdFmt::Result
where
    K: StdFmt::Debug + ?Sized,
{
    let marker: &str = match view.side() {
        Side::Root => "[*]",
        Side::Left => "[L]",
        Side::Right => "[R]",
    };
    write!(f, "{:indent$}{marker} <{}>", "", view.num_keys(), indent = depth * 2)?;
    for key in view.keys() {
        write!(f, " {key:?}")?;
    }
    writeln!(f, " (bf {})", view.balance_factor())
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::TreeConfig;

    fn tree_of(capacity: usize, values: impl IntoIterator<Item = u32>) -> TTree<u32> {
        let mut tree = TTree::with_ord_config(TreeConfig::new(capacity, true)).unwrap();
        for v in values {
            tree.insert(v).unwrap();
        }
        tree
    }

    #[test]
    fn test_dump_of_small_tree() {
        let tree = tree_of(4, [10, 20, 30, 40, 50]);
        let dump = tree.dump().to_string();

        assert_eq!(dump, "[*] <4> 10 20 30 40 (bf 1)\n  [R] <1> 50 (bf 0)\n");
    }

    #[test]
    fn test_dump_of_empty_tree() {
        let tree: TTree<u32> = TTree::new();
        assert_eq!(tree.dump().to_string(), "(empty)\n");
    }

    #[test]
    fn test_for_each_node_counts_keys() {
        let tree = tree_of(3, 0..100);
        let mut keys: usize = 0;
        let mut nodes: usize = 0;
        tree.for_each_node(|view, _| {
            keys += view.num_keys();
            nodes += 1;
        });

        assert_eq!(keys, 100);
        assert_eq!(nodes, tree.node_count());
    }

    #[test]
    fn test_leftmost_and_rightmost_hold_extremes() {
        let tree = tree_of(4, (0..64).rev());

        let left = tree.node(tree.leftmost().unwrap()).unwrap();
        let right = tree.node(tree.rightmost().unwrap()).unwrap();
        assert_eq!(left.items().next(), Some(&0));
        assert_eq!(right.items().last(), Some(&63));
        assert_eq!(right.successor(), None);
    }

    #[test]
    fn test_depth_bound() {
        // A height-balanced tree of n nodes is at most ~1.44 log2(n) deep.
        let tree = tree_of(2, 0..1000);
        let nodes = tree.node_count() as f64;
        let bound = (1.45 * nodes.log2()).ceil() as usize;
        assert!(tree.depth() <= bound, "depth {} > {bound}", tree.depth());
        tree.validate().unwrap();
    }

    #[test]
    fn test_violation_display() {
        let tree = tree_of(2, [1]);
        let node = tree.root().unwrap();
        let err = InvariantViolation::BalanceMismatch {
            node,
            stored: 1,
            measured: 0,
        };
        assert!(err.to_string().contains("stores balance 1 but measures 0"));
    }
}
