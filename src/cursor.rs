//! Positional handles into a tree.
//!
//! A [`Cursor`] is a small `Copy` value naming a node and a slot inside it.
//! It does not borrow the tree; every operation that reads or moves it goes
//! through a `TTree` method, which rejects cursors whose node was freed.
//!
//! # States
//!
//! ```text
//!            lookup (hit)                 lookup (miss)
//!                 |                            |
//!                 v                            v
//!   +--------> OPENED  <---- next/prev ---- PENDING
//!   |             |                            |
//!   |        delete_at_cursor            insert_at_cursor
//!   |             v                            |
//!   |          CLOSED                          |
//!   +------------------------------------------+
//! ```
//!
//! - `Opened`: the cursor addresses an existing item.
//! - `Pending`: the cursor addresses the place a missing key would be
//!   inserted. When that place is inside a node, `side` is
//!   [`CursorSide::Bound`] and `index` is the insertion slot. When the node is
//!   full, the key would go into a new child and `side` names which one.
//! - `Closed`: the cursor is spent. Navigation reports
//!   [`CursorStep::End`](crate::CursorStep::End) and changes nothing.

use crate::alloc::NodeId;

/// Lifecycle state of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Spent; only a fresh lookup or `cursor_open` revives it.
    Closed,
    /// Positioned on an existing item.
    Opened,
    /// Positioned where a missing key belongs.
    Pending,
}

/// Where a pending insertion lands relative to the cursor's node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorSide {
    /// Inside the node, at the cursor's index.
    Bound,
    /// In a new left child of the node.
    Left,
    /// In a new right child of the node.
    Right,
}

/// Which end of a node [`TTree::cursor_open_on`](crate::TTree::cursor_open_on)
/// positions at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seek {
    /// The node's smallest key.
    Start,
    /// The node's greatest key.
    End,
}

/// Outcome of a cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum CursorStep {
    /// The cursor moved and addresses an item.
    Ok,
    /// There was nothing further in that direction.
    End,
}

impl CursorStep {
    /// `true` for [`CursorStep::Ok`].
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Node, slot, side and state of a position in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub(crate) node: Option<NodeId>,
    pub(crate) idx: usize,
    pub(crate) side: CursorSide,
    pub(crate) state: CursorState,
}

impl Cursor {
    #[inline]
    pub(crate) const fn opened(node: NodeId, idx: usize) -> Self {
        Self {
            node: Some(node),
            idx,
            side: CursorSide::Bound,
            state: CursorState::Opened,
        }
    }

    #[inline]
    pub(crate) const fn pending(node: Option<NodeId>, idx: usize, side: CursorSide) -> Self {
        Self {
            node,
            idx,
            side,
            state: CursorState::Pending,
        }
    }

    /// Cursor into an empty tree.
    #[inline]
    pub(crate) const fn pending_empty(first_slot: usize) -> Self {
        Self::pending(None, first_slot, CursorSide::Bound)
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> CursorState {
        self.state
    }

    /// Node the cursor refers to. `None` for a cursor into an empty tree.
    #[inline]
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Slot inside the node.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.idx
    }

    /// Placement hint of a pending cursor.
    #[inline]
    #[must_use]
    pub const fn side(&self) -> CursorSide {
        self.side
    }

    /// Addresses an existing item.
    #[inline]
    #[must_use]
    pub const fn is_opened(&self) -> bool {
        matches!(self.state, CursorState::Opened)
    }

    /// Addresses an insertion point.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, CursorState::Pending)
    }

    /// Spent.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, CursorState::Closed)
    }

    #[inline]
    pub(crate) const fn close(&mut self) {
        self.state = CursorState::Closed;
        self.side = CursorSide::Bound;
    }
}
