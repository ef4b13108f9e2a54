//! Deletion and in-place replacement.
//!
//! Removing a key leaves its node as is while the node stays above the
//! minimum occupancy (three quarters of capacity). Below it the node is
//! repaired, depending on its shape:
//!
//! - internal: borrow the smallest key of the successor, which is always a
//!   leaf or half-leaf, and repair that node instead;
//! - half-leaf: pull the keys of its single leaf child in when they fit,
//!   emptying the child;
//! - leaf: nothing to do unless it is empty.
//!
//! An emptied leaf is detached and the height change propagated upward.

use super::TTree;
use crate::alloc::{ItemId, NodeId};
use crate::cursor::{Cursor, CursorState};
use crate::error::{Rejected, TreeError};
use crate::node::{Node, Side};
use crate::tracing_helpers::{debug_log, trace_log};

impl<T, K: ?Sized> TTree<T, K> {
    /// Remove and return the item with an equal key.
    ///
    /// With duplicate keys allowed, one of the equal items is removed.
    pub fn delete(&mut self, key: &K) -> Option<T> {
        let (found, mut cursor) = self.locate(key);
        found?;
        self.remove_at(&mut cursor)
    }

    /// Remove and return the item under an opened cursor.
    ///
    /// The cursor is closed afterwards.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if the cursor is not opened on a live
    /// item.
    pub fn delete_at_cursor(&mut self, cursor: &mut Cursor) -> Result<T, TreeError> {
        if cursor.state != CursorState::Opened {
            return Err(TreeError::InvalidCursor);
        }
        let Some(node) = cursor.node.and_then(|id| self.nodes.get(id)) else {
            return Err(TreeError::InvalidCursor);
        };
        if !(node.start..node.end).contains(&cursor.idx) {
            return Err(TreeError::InvalidCursor);
        }

        self.remove_at(cursor).ok_or(TreeError::InvalidCursor)
    }

    /// Swap the item with an equal key for `item`, returning the old one.
    ///
    /// The new item must compare equal to the old one: it takes over the
    /// old item's slot and no reordering happens.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if no item has an equal key. The new item is
    /// handed back in the [`Rejected`].
    pub fn replace(&mut self, key: &K, item: T) -> Result<T, Rejected<T>> {
        let Some(found) = self.locate(key).0 else {
            return Err(Rejected::new(TreeError::NotFound, item));
        };
        debug_assert!((self.compare)(key, (self.key_of)(&item)).is_eq());

        Ok(std::mem::replace(&mut self.items[found], item))
    }

    /// Remove the item at an opened cursor that is known to be in range.
    fn remove_at(&mut self, cursor: &mut Cursor) -> Option<T> {
        let node: NodeId = cursor.node?;
        let removed: ItemId = self.nodes.get(node)?.key(cursor.idx);
        let item: T = self.items.remove(removed)?;

        let n: &mut Node = &mut self.nodes[node];
        let mut idx: usize = cursor.idx;
        n.shrink_window(&mut idx);
        cursor.close();
        cursor.idx = idx.min(n.max_idx());

        if n.num_keys() > self.config.min_occupancy() {
            return Some(item);
        }

        let mut target: NodeId = node;
        if n.is_internal() {
            let Some(successor) = n.successor else {
                debug_assert!(false, "internal node {node:?} without successor");
                return Some(item);
            };
            self.borrow_from_successor(node, successor);
            if cursor.idx > self.nodes[node].max_idx() {
                cursor.idx = self.nodes[node].max_idx();
            }

            let succ: &Node = &self.nodes[successor];
            if succ.is_leaf() && !succ.is_empty() {
                return Some(item);
            }
            target = successor;
        }

        let t: &Node = &self.nodes[target];
        if !t.is_leaf() {
            let (child, side) = match (t.left, t.right) {
                (Some(left), None) => (left, Side::Left),
                (None, Some(right)) => (right, Side::Right),
                _ => {
                    debug_assert!(false, "repair target {target:?} is internal");
                    return Some(item);
                }
            };
            let capacity: usize = self.config.keys_per_node;
            if self.nodes[child].num_keys() > capacity - t.num_keys() {
                return Some(item);
            }
            self.merge_child(target, child, side, cursor);
            target = child;
        }

        if !self.nodes[target].is_empty() {
            return Some(item);
        }
        self.remove_empty_leaf(target);
        Some(item)
    }

    /// Move the successor's smallest key to the end of `node`.
    fn borrow_from_successor(&mut self, node: NodeId, successor: NodeId) {
        let (n, succ) = self.nodes.pair_mut(node, successor);
        let borrowed: ItemId = succ.pop_min();

        let mut idx: usize = n.end;
        n.grow_window(&mut idx);
        n.keys[idx] = borrowed;

        trace_log!(node = ?node, successor = ?successor, "borrowed successor minimum");
    }

    /// Pull every key of the single child `child` (on `side`) into `node`,
    /// leaving the child empty. The caller checked that the keys fit.
    fn merge_child(&mut self, node: NodeId, child: NodeId, side: Side, cursor: &mut Cursor) {
        let capacity: usize = self.config.keys_per_node;
        let tracks_node: bool = cursor.node == Some(node);
        let (n, c) = self.nodes.pair_mut(node, child);
        let own: usize = n.num_keys();
        let incoming: usize = c.num_keys();

        match side {
            Side::Right => {
                // Make room above the window.
                if n.end + incoming > capacity {
                    let start: usize = capacity - own - incoming;
                    n.keys.copy_within(n.start..n.end, start);
                    if tracks_node {
                        cursor.idx = cursor.idx.saturating_sub(n.start - start);
                    }
                    n.start = start;
                    n.end = start + own;
                }
                n.keys[n.end..n.end + incoming].copy_from_slice(c.window());
                n.end += incoming;
            }
            Side::Left => {
                // Make room below the window.
                if n.start < incoming {
                    let start: usize = incoming;
                    n.keys.copy_within(n.start..n.end, start);
                    if tracks_node {
                        cursor.idx += start - n.start;
                    }
                    n.start = start;
                    n.end = start + own;
                }
                n.keys[n.start - incoming..n.start].copy_from_slice(c.window());
                n.start -= incoming;
            }
            Side::Root => {
                debug_assert!(false, "merge from a root slot");
                return;
            }
        }
        c.drain();

        debug_log!(node = ?node, child = ?child, keys = incoming, "merged child into parent");
    }

    /// Detach and free an empty leaf, rebalancing above it.
    fn remove_empty_leaf(&mut self, leaf: NodeId) {
        let (parent, side) = {
            let node: &Node = &self.nodes[leaf];
            (node.parent, node.side)
        };

        match parent {
            None => {
                self.root = None;
            }
            Some(parent) => {
                self.nodes[parent].set_child(side, None);
                self.fixup_after_deletion(leaf);
            }
        }

        self.nodes.remove(leaf);
        debug_log!(node = ?leaf, "leaf removed");
    }
}

// ============================================================================
//  Tests
// ============================================================================
