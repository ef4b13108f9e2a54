//! Cursor positioning and stepping.
//!
//! Forward steps follow the successor chain, so `cursor_next` is O(1)
//! amortized. Backward steps have no chain to follow and walk the tree:
//! either down to the greatest node of the left subtree or up to the first
//! ancestor reached from its right side.

use super::TTree;
use crate::alloc::NodeId;
use crate::cursor::{Cursor, CursorSide, CursorState, CursorStep, Seek};
use crate::error::TreeError;
use crate::node::{Node, Side};

impl<T, K: ?Sized> TTree<T, K> {
    /// Cursor on the root's smallest key, or a pending cursor if the tree
    /// is empty.
    #[must_use]
    pub fn cursor_open(&self) -> Cursor {
        match self.root {
            Some(root) => Cursor::opened(root, self.nodes[root].min_idx()),
            None => Cursor::pending_empty(self.config.first_slot()),
        }
    }

    /// Cursor on the smallest or greatest key of `node`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidCursor`] if `node` is not a live node of this
    /// tree.
    pub fn cursor_open_on(&self, node: NodeId, seek: Seek) -> Result<Cursor, TreeError> {
        let n: &Node = self.nodes.get(node).ok_or(TreeError::InvalidCursor)?;
        let idx: usize = match seek {
            Seek::Start => n.min_idx(),
            Seek::End => n.max_idx(),
        };
        Ok(Cursor::opened(node, idx))
    }

    /// Move `cursor` to the smallest item.
    ///
    /// On an empty tree the cursor becomes pending and `End` is returned.
    pub fn cursor_first(&self, cursor: &mut Cursor) -> CursorStep {
        let Some(root) = self.root else {
            *cursor = Cursor::pending_empty(self.config.first_slot());
            return CursorStep::End;
        };
        let node: NodeId = self.subtree_min(root);
        *cursor = Cursor::opened(node, self.nodes[node].min_idx());
        CursorStep::Ok
    }

    /// Move `cursor` to the greatest item.
    ///
    /// On an empty tree the cursor becomes pending and `End` is returned.
    pub fn cursor_last(&self, cursor: &mut Cursor) -> CursorStep {
        let Some(root) = self.root else {
            *cursor = Cursor::pending_empty(self.config.first_slot());
            return CursorStep::End;
        };
        let node: NodeId = self.subtree_max(root);
        *cursor = Cursor::opened(node, self.nodes[node].max_idx());
        CursorStep::Ok
    }

    /// Advance `cursor` to the next-greater item.
    ///
    /// A pending cursor first settles on the item at or after its insertion
    /// point. A closed or stale cursor yields `End` and is left unchanged.
    /// When the last item is passed the cursor stays on it and `End` is
    /// returned.
    pub fn cursor_next(&self, cursor: &mut Cursor) -> CursorStep {
        let Some(node) = self.cursor_node(cursor) else {
            return CursorStep::End;
        };

        if cursor.state == CursorState::Pending {
            cursor.state = CursorState::Opened;
            let side: CursorSide = std::mem::replace(&mut cursor.side, CursorSide::Bound);

            let bound: bool = side == CursorSide::Bound;
            if side == CursorSide::Left || (bound && cursor.idx < node.min_idx()) {
                cursor.idx = node.min_idx();
                return CursorStep::Ok;
            }
            if bound && cursor.idx <= node.max_idx() {
                return CursorStep::Ok;
            }
            // Past the node's maximum: continue from it.
            cursor.idx = node.max_idx();
        }

        if cursor.idx < node.max_idx() {
            cursor.idx += 1;
            return CursorStep::Ok;
        }

        match node.successor {
            Some(next) => {
                cursor.node = Some(next);
                cursor.idx = self.nodes[next].min_idx();
                CursorStep::Ok
            }
            None => CursorStep::End,
        }
    }

    /// Move `cursor` back to the next-smaller item.
    ///
    /// A pending cursor first settles on the item before its insertion
    /// point. A closed or stale cursor yields `End` and is left unchanged.
    /// When the first item is passed the cursor stays on it and `End` is
    /// returned.
    pub fn cursor_prev(&self, cursor: &mut Cursor) -> CursorStep {
        let Some(node) = self.cursor_node(cursor) else {
            return CursorStep::End;
        };

        if cursor.state == CursorState::Pending {
            cursor.state = CursorState::Opened;
            let side: CursorSide = std::mem::replace(&mut cursor.side, CursorSide::Bound);

            let bound: bool = side == CursorSide::Bound;
            if side == CursorSide::Right || (bound && cursor.idx > node.max_idx()) {
                cursor.idx = node.max_idx();
                return CursorStep::Ok;
            }
            if side == CursorSide::Left || cursor.idx < node.min_idx() {
                cursor.idx = node.min_idx();
            }
        }

        if cursor.idx > node.min_idx() {
            cursor.idx -= 1;
            return CursorStep::Ok;
        }

        let Some(id) = cursor.node else {
            return CursorStep::End;
        };
        match self.predecessor_node(id) {
            Some(prev) => {
                cursor.node = Some(prev);
                cursor.idx = self.nodes[prev].max_idx();
                CursorStep::Ok
            }
            None => CursorStep::End,
        }
    }

    /// Item under an opened cursor.
    pub fn cursor_item(&self, cursor: &Cursor) -> Option<&T> {
        if cursor.state != CursorState::Opened {
            return None;
        }
        let node: &Node = self.nodes.get(cursor.node?)?;
        if !(node.start..node.end).contains(&cursor.idx) {
            return None;
        }
        self.items.get(node.key(cursor.idx))
    }

    /// Key of the item under an opened cursor.
    pub fn cursor_key(&self, cursor: &Cursor) -> Option<&K> {
        self.cursor_item(cursor).map(self.key_of)
    }

    /// Live, non-empty node of a cursor that may move.
    fn cursor_node(&self, cursor: &Cursor) -> Option<&Node> {
        if cursor.state == CursorState::Closed {
            return None;
        }
        self.nodes
            .get(cursor.node?)
            .filter(|node| !node.is_empty())
    }

    /// In-order predecessor node: the greatest node of the left subtree,
    /// else the nearest ancestor that has `node` in its right subtree.
    fn predecessor_node(&self, node: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[node].left {
            return Some(self.subtree_max(left));
        }

        let mut current: NodeId = node;
        while self.nodes[current].side == Side::Left {
            current = self.nodes[current].parent?;
        }
        self.nodes[current].parent
    }
}

// ============================================================================
//  Tests
// ============================================================================
