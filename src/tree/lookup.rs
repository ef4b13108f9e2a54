//! Two-phase search.
//!
//! Phase one descends the tree comparing the probe only with each node's
//! minimum key, remembering the last node whose minimum was below the probe
//! (the *bounding candidate*). Phase two checks the candidate's maximum and
//! binary-searches its interior. This touches one key per level instead of
//! two, at the cost of a final in-node search.
//!
//! When the key is absent the returned cursor is `Pending` and describes
//! exactly where an insertion would go, which is what `insert` consumes.

use std::cmp::Ordering;

use super::TTree;
use crate::alloc::{ItemId, NodeId};
use crate::cursor::{Cursor, CursorSide};
use crate::node::Node;

impl<T, K: ?Sized> TTree<T, K> {
    /// Search for `key`.
    ///
    /// Returns the matching item, if any, and a cursor. On a hit the cursor
    /// is `Opened` on the item. On a miss it is `Pending` at the insertion
    /// point for `key`. With duplicate keys allowed, any one of the equal
    /// items may be returned.
    ///
    /// ```
    /// use ttree::{CursorState, TTree};
    ///
    /// let mut tree: TTree<u32> = TTree::new();
    /// tree.insert(10).unwrap();
    ///
    /// let (hit, cursor) = tree.lookup(&10);
    /// assert_eq!(hit, Some(&10));
    /// assert_eq!(cursor.state(), CursorState::Opened);
    ///
    /// let (miss, cursor) = tree.lookup(&11);
    /// assert_eq!(miss, None);
    /// assert_eq!(cursor.state(), CursorState::Pending);
    /// ```
    pub fn lookup(&self, key: &K) -> (Option<&T>, Cursor) {
        let (found, cursor) = self.locate(key);
        (found.map(|item| &self.items[item]), cursor)
    }

    /// The item with an equal key.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&T> {
        self.locate(key).0.map(|item| &self.items[item])
    }

    /// Whether an item with an equal key exists.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).0.is_some()
    }

    /// Smallest item.
    pub fn first(&self) -> Option<&T> {
        let node: &Node = &self.nodes[self.subtree_min(self.root?)];
        Some(&self.items[node.min_key()])
    }

    /// Greatest item.
    pub fn last(&self) -> Option<&T> {
        let node: &Node = &self.nodes[self.subtree_max(self.root?)];
        Some(&self.items[node.max_key()])
    }

    /// Handle-level search shared by every keyed operation.
    pub(super) fn locate(&self, key: &K) -> (Option<ItemId>, Cursor) {
        let Some(root) = self.root else {
            return (None, Cursor::pending_empty(self.config.first_slot()));
        };

        // Phase one: descend on minimum keys.
        let mut target: NodeId = root;
        let mut bound: Option<NodeId> = None;
        let mut side = CursorSide::Bound;
        let mut last_cmp = Ordering::Equal;
        let mut next: Option<NodeId> = Some(root);

        while let Some(id) = next {
            let node: &Node = &self.nodes[id];
            target = id;
            last_cmp = self.compare_to(key, node.min_key());

            match last_cmp {
                Ordering::Less => {
                    side = CursorSide::Left;
                    next = node.left;
                }
                Ordering::Greater => {
                    bound = Some(id);
                    side = CursorSide::Right;
                    next = node.right;
                }
                Ordering::Equal => {
                    return (Some(node.min_key()), Cursor::opened(id, node.min_idx()));
                }
            }
        }

        // Phase two: the key is above the candidate's minimum; see whether
        // it is also within its maximum.
        if let Some(id) = bound {
            let node: &Node = &self.nodes[id];
            match self.compare_to(key, node.max_key()) {
                Ordering::Equal => {
                    return (Some(node.max_key()), Cursor::opened(id, node.max_idx()));
                }
                Ordering::Less => {
                    return match self.search_interior(node, key) {
                        Ok(idx) => (Some(node.key(idx)), Cursor::opened(id, idx)),
                        Err(idx) => (None, Cursor::pending(Some(id), idx, CursorSide::Bound)),
                    };
                }
                Ordering::Greater => {}
            }
        }

        // The key lies between two nodes. It belongs at an edge of the last
        // node visited, or in a new child of it when that node is full.
        let node: &Node = &self.nodes[target];
        if !node.is_full() {
            let idx: usize = if bound != Some(target) || last_cmp == Ordering::Less {
                node.min_idx()
            } else {
                node.end
            };
            return (None, Cursor::pending(Some(target), idx, CursorSide::Bound));
        }

        (
            None,
            Cursor::pending(Some(target), self.config.first_slot(), side),
        )
    }

    /// Binary search strictly between the minimum and maximum of `node`.
    ///
    /// `Ok(slot)` on a match, otherwise `Err(slot)` with the slot a new key
    /// must precede.
    fn search_interior(&self, node: &Node, key: &K) -> Result<usize, usize> {
        let mut low: usize = node.min_idx() + 1;
        let mut high: usize = node.max_idx();

        while low < high {
            let mid: usize = low + (high - low) / 2;
            match self.compare_to(key, node.key(mid)) {
                Ordering::Less => high = mid,
                Ordering::Greater => low = mid + 1,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(low)
    }
}

// ============================================================================
//  Tests
// ============================================================================
