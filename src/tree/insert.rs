//! Insertion.
//!
//! An insertion either fits into the node a pending cursor names, or
//! attaches a new one-key leaf. When the target node is full its greatest
//! key is evicted to make room; the evicted key then goes to the front of
//! the successor node, or into a new leaf when the successor is full too.

use super::TTree;
use crate::alloc::{ItemId, NodeId};
use crate::cursor::{Cursor, CursorSide, CursorState};
use crate::error::{Rejected, TreeError};
use crate::node::{Node, Side};
use crate::tracing_helpers::{debug_log, trace_log};

impl<T, K: ?Sized> TTree<T, K> {
    /// Insert `item`.
    ///
    /// # Errors
    ///
    /// On a unique tree, [`TreeError::DuplicateKey`] if an item with an
    /// equal key is already stored. The item is handed back in the
    /// [`Rejected`].
    pub fn insert(&mut self, item: T) -> Result<(), Rejected<T>> {
        let (found, mut cursor) = self.locate((self.key_of)(&item));
        if found.is_some() && self.config.unique {
            return Err(Rejected::new(TreeError::DuplicateKey, item));
        }
        self.insert_at_cursor(&mut cursor, item)
    }

    /// Insert `item` at the position of `cursor`, without searching.
    ///
    /// The cursor is expected to come from a [`lookup`](Self::lookup) of the
    /// item's key with no modification of the tree in between; the tree does
    /// not re-check ordering or uniqueness. On success the cursor is
    /// `Opened` on the inserted item.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if the cursor is closed, refers to a
    /// freed node, or names a position that does not exist in the tree.
    pub fn insert_at_cursor(&mut self, cursor: &mut Cursor, item: T) -> Result<(), Rejected<T>> {
        if !self.can_insert_at(cursor) {
            return Err(Rejected::new(TreeError::InvalidCursor, item));
        }

        let new_item: ItemId = self.items.insert(item);
        let Some(node) = cursor.node else {
            self.plant_root(new_item, cursor);
            return Ok(());
        };

        match cursor.side {
            CursorSide::Bound => self.insert_into(node, new_item, cursor),
            CursorSide::Left => self.attach_leaf(node, Side::Left, new_item, cursor),
            CursorSide::Right => self.attach_leaf(node, Side::Right, new_item, cursor),
        }
        Ok(())
    }

    /// Whether `cursor` names a position this tree can insert at.
    fn can_insert_at(&self, cursor: &Cursor) -> bool {
        if cursor.state == CursorState::Closed {
            return false;
        }
        let Some(id) = cursor.node else {
            return self.root.is_none();
        };
        let Some(node) = self.nodes.get(id) else {
            return false;
        };

        match cursor.side {
            CursorSide::Bound => {
                (node.start..=node.end).contains(&cursor.idx)
                    && !(node.is_full() && cursor.idx == node.end)
            }
            CursorSide::Left => node.left.is_none(),
            CursorSide::Right => node.right.is_none(),
        }
    }

    /// First item of an empty tree.
    fn plant_root(&mut self, item: ItemId, cursor: &mut Cursor) {
        let first: usize = self.config.first_slot();
        let root: NodeId = self
            .nodes
            .insert(Node::leaf(self.config.keys_per_node, first, item, None, Side::Root));
        self.root = Some(root);
        *cursor = Cursor::opened(root, first);
        debug_log!(node = ?root, "root created");
    }

    /// Insert into `node` at `cursor.idx`, evicting its maximum if full.
    fn insert_into(&mut self, node: NodeId, item: ItemId, cursor: &mut Cursor) {
        let n: &mut Node = &mut self.nodes[node];
        let evicted: Option<ItemId> = n.is_full().then(|| n.pop_max());

        let mut idx: usize = cursor.idx;
        n.grow_window(&mut idx);
        n.keys[idx] = item;
        *cursor = Cursor::opened(node, idx);

        let Some(evicted) = evicted else {
            return;
        };
        let successor: Option<NodeId> = n.successor;
        let has_right: bool = n.right.is_some();

        trace_log!(node = ?node, "node full, evicting maximum");

        // Without a right subtree the evicted key becomes the node's new
        // right child. Otherwise it is the smallest key of the right
        // subtree, which starts at the successor.
        let Some(successor) = successor.filter(|_| has_right) else {
            self.attach_overflow(node, Side::Right, evicted, cursor);
            return;
        };

        let succ: &mut Node = &mut self.nodes[successor];
        if succ.is_full() {
            self.attach_overflow(successor, Side::Left, evicted, cursor);
            return;
        }

        let mut at: usize = succ.min_idx();
        succ.grow_window(&mut at);
        succ.keys[at] = evicted;
    }

    /// Attach a leaf holding the inserted key; the cursor moves onto it.
    fn attach_leaf(&mut self, parent: NodeId, side: Side, item: ItemId, cursor: &mut Cursor) {
        let leaf: NodeId = self.new_leaf(parent, side, item);
        *cursor = Cursor::opened(leaf, self.config.first_slot());
        self.fixup_after_insertion(leaf, cursor);
    }

    /// Attach a leaf holding an evicted key; the cursor keeps tracking the
    /// inserted key elsewhere.
    fn attach_overflow(&mut self, parent: NodeId, side: Side, item: ItemId, cursor: &mut Cursor) {
        let leaf: NodeId = self.new_leaf(parent, side, item);
        self.fixup_after_insertion(leaf, cursor);
    }

    fn new_leaf(&mut self, parent: NodeId, side: Side, item: ItemId) -> NodeId {
        let first: usize = self.config.first_slot();
        let leaf: NodeId = self.nodes.insert(Node::leaf(
            self.config.keys_per_node,
            first,
            item,
            Some(parent),
            side,
        ));
        self.nodes[parent].set_child(side, Some(leaf));
        debug_log!(node = ?leaf, parent = ?parent, side = ?side, "leaf attached");
        leaf
    }
}

// ============================================================================
//  Tests
// ============================================================================
