//! T*-tree node layout.
//!
//! A node owns a fixed-capacity array of item handles. Only a contiguous
//! window of that array is live, and the window slides inside the array as
//! keys are added and removed so that most insertions and deletions shift
//! only the shorter half of the live keys.
//!
//! ```text
//!               [^]                  <- parent
//!   slots: [ . . k1 k2 k3 k4 . . ]   <- window = start..end
//!              /            \
//!            (L)            (R)      <- children
//! ```
//!
//! The window is half-open (`start..end`), so an empty node is simply
//! `start == end`. Empty nodes only exist for the duration of a delete.

use crate::alloc::{ItemId, NodeId};

// ============================================================================
//  Side
// ============================================================================

/// Position of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The node is the tree root and has no parent.
    Root,
    /// The node is its parent's left child.
    Left,
    /// The node is its parent's right child.
    Right,
}

impl Side {
    /// The mirror side. The root is its own mirror.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Root => Self::Root,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Change applied to a parent's balance factor when a subtree on this
    /// side grows by one level.
    #[inline]
    pub(crate) const fn balance_delta(self) -> i8 {
        match self {
            Self::Root => 0,
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

// ============================================================================
//  Node
// ============================================================================

/// One bounded, sorted chunk of the key space.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Item handles; only `start..end` is meaningful.
    pub(crate) keys: Box<[ItemId]>,
    /// First live slot.
    pub(crate) start: usize,
    /// One past the last live slot.
    pub(crate) end: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// Node holding the next-greater keys.
    pub(crate) successor: Option<NodeId>,
    /// height(right) - height(left).
    pub(crate) balance: i8,
    pub(crate) side: Side,
}

impl Node {
    /// A detached node holding one key at `slot`.
    pub(crate) fn leaf(
        capacity: usize,
        slot: usize,
        item: ItemId,
        parent: Option<NodeId>,
        side: Side,
    ) -> Self {
        debug_assert!(slot < capacity);

        let mut keys: Box<[ItemId]> = vec![ItemId::VACANT; capacity].into_boxed_slice();
        keys[slot] = item;

        Self {
            keys,
            start: slot,
            end: slot + 1,
            parent,
            left: None,
            right: None,
            successor: None,
            balance: 0,
            side,
        }
    }

    // ========================================================================
    //  Window
    // ========================================================================

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) const fn num_keys(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub(crate) const fn is_full(&self) -> bool {
        self.num_keys() == self.capacity()
    }

    #[inline]
    pub(crate) const fn min_idx(&self) -> usize {
        self.start
    }

    /// Slot of the greatest key. Meaningless for an empty node.
    #[inline]
    pub(crate) const fn max_idx(&self) -> usize {
        self.end.saturating_sub(1)
    }

    #[inline]
    pub(crate) fn key(&self, idx: usize) -> ItemId {
        self.keys[idx]
    }

    #[inline]
    pub(crate) fn min_key(&self) -> ItemId {
        self.keys[self.start]
    }

    #[inline]
    pub(crate) fn max_key(&self) -> ItemId {
        self.keys[self.max_idx()]
    }

    /// Live item handles in ascending key order.
    #[inline]
    pub(crate) fn window(&self) -> &[ItemId] {
        &self.keys[self.start..self.end]
    }

    /// Free slots left of the window.
    #[inline]
    const fn free_left(&self) -> usize {
        self.start
    }

    /// Free slots right of the window.
    #[inline]
    const fn free_right(&self) -> usize {
        self.capacity() - self.end
    }

    /// Open a slot so that a new key can be written at `*idx`.
    ///
    /// `*idx` is the slot the new key must precede (`end` appends). The
    /// window grows toward whichever side has more free slots; growing left
    /// shifts the lower keys down, which moves the insertion slot to
    /// `*idx - 1`, so `idx` is updated in place. The caller writes the key.
    pub(crate) fn grow_window(&mut self, idx: &mut usize) {
        debug_assert!(!self.is_full());
        debug_assert!((self.start..=self.end).contains(idx));

        if self.free_right() > self.free_left() {
            self.keys.copy_within(*idx..self.end, *idx + 1);
            self.end += 1;
        } else {
            *idx -= 1;
            self.start -= 1;
            self.keys.copy_within(self.start + 1..*idx + 1, self.start);
        }
    }

    /// Remove the key at `*idx`, closing the gap.
    ///
    /// The window gives up a slot on the side that already has less free
    /// space. Afterwards `*idx` addresses the key that followed the removed
    /// one (or `end` if it was the maximum).
    pub(crate) fn shrink_window(&mut self, idx: &mut usize) {
        debug_assert!((self.start..self.end).contains(idx));

        if self.free_right() <= self.free_left() {
            self.keys.copy_within(*idx + 1..self.end, *idx);
            self.end -= 1;
        } else {
            self.keys.copy_within(self.start..*idx, self.start + 1);
            self.start += 1;
            *idx += 1;
        }
    }

    /// Detach and return the greatest key.
    pub(crate) fn pop_max(&mut self) -> ItemId {
        debug_assert!(!self.is_empty());
        self.end -= 1;
        self.keys[self.end]
    }

    /// Detach and return the smallest key.
    pub(crate) fn pop_min(&mut self) -> ItemId {
        debug_assert!(!self.is_empty());
        let item: ItemId = self.keys[self.start];
        self.start += 1;
        item
    }

    /// Reset the window to a single key at `slot`.
    pub(crate) fn collapse_to(&mut self, slot: usize, item: ItemId) {
        self.keys[slot] = item;
        self.start = slot;
        self.end = slot + 1;
    }

    /// Mark the node empty.
    pub(crate) const fn drain(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    // ========================================================================
    //  Links
    // ========================================================================

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Root => None,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
            Side::Root => debug_assert!(false, "root is not a child slot"),
        }
    }

    /// No children.
    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Exactly one child.
    #[inline]
    pub(crate) const fn is_half_leaf(&self) -> bool {
        self.left.is_some() != self.right.is_some()
    }

    /// Both children.
    #[inline]
    pub(crate) const fn is_internal(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Balance factor implied by which children exist. Only valid for
    /// leaves and half-leaves, whose single child is necessarily a leaf.
    #[inline]
    pub(crate) fn structural_balance(&self) -> i8 {
        i8::from(self.right.is_some()) - i8::from(self.left.is_some())
    }
}

// ============================================================================
//  Tests
// ============================================================================
