//! Slot arena backing tree nodes and stored items.
//!
//! The tree's parent, child and successor links form a cyclic graph, so nodes
//! are not owned through `Box` chains. Instead every node lives in an
//! [`Arena`] slot and links are plain integer handles. Caller items live in a
//! second arena so that node key slots only ever hold small [`ItemId`]
//! handles: rebalancing moves handles between nodes, never the items.
//!
//! # Handle Validity
//!
//! Every slot carries a generation counter that is bumped when the slot is
//! freed. A handle records the generation it was issued with, so a handle to
//! a freed (or freed and reused) slot is detected instead of aliasing the new
//! occupant:
//!
//! - [`Arena::get`] / [`Arena::get_mut`] return `None` for stale handles.
//! - Indexing (`arena[handle]`) is reserved for links the tree itself
//!   maintains and panics on a stale handle, which would mean a broken
//!   internal invariant.

use std::fmt as StdFmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

// ============================================================================
//  Handles
// ============================================================================

/// Untyped slot address plus the generation it was issued with.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RawHandle {
    index: u32,
    generation: u32,
}

impl RawHandle {
    /// Handle that never matches an occupied slot.
    pub(crate) const DANGLING: Self = Self {
        index: u32::MAX,
        generation: u32::MAX,
    };
}

impl StdFmt::Debug for RawHandle {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Typed wrapper over [`RawHandle`].
pub(crate) trait ArenaHandle: Copy {
    fn from_raw(raw: RawHandle) -> Self;
    fn raw(self) -> RawHandle;
}

/// Handle to a tree node.
///
/// Node handles are what a [`Cursor`](crate::Cursor) and a
/// [`NodeView`](crate::NodeView) refer to. They are cheap to copy and never
/// keep a node alive: once deletion frees the node, every handle to it
/// becomes stale and is rejected by the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(RawHandle);

impl ArenaHandle for NodeId {
    #[inline]
    fn from_raw(raw: RawHandle) -> Self {
        Self(raw)
    }

    #[inline]
    fn raw(self) -> RawHandle {
        self.0
    }
}

impl StdFmt::Debug for NodeId {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "NodeId({:?})", self.0)
    }
}

/// Handle to a stored item. Node key slots hold these.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ItemId(RawHandle);

impl ItemId {
    /// Filler for key slots outside a node's window.
    pub(crate) const VACANT: Self = Self(RawHandle::DANGLING);
}

impl ArenaHandle for ItemId {
    #[inline]
    fn from_raw(raw: RawHandle) -> Self {
        Self(raw)
    }

    #[inline]
    fn raw(self) -> RawHandle {
        self.0
    }
}

impl StdFmt::Debug for ItemId {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "ItemId({:?})", self.0)
    }
}

// ============================================================================
//  Arena
// ============================================================================

#[derive(Debug)]
enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Generation-checked slot arena with an intrusive free list.
///
/// Freed slots are reused LIFO. Storage only grows; [`Arena::clear`] drops
/// every value and resets the arena to empty.
pub(crate) struct Arena<H: ArenaHandle, T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
    _marker: PhantomData<H>,
}

impl<H: ArenaHandle, T> Arena<H, T> {
    /// Create an empty arena.
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Store `value` and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX - 1` slots would be needed.
    pub(crate) fn insert(&mut self, value: T) -> H {
        self.len += 1;

        if let Some(index) = self.free_head {
            let slot: &mut Slot<T> = &mut self.slots[index as usize];
            let Slot::Vacant {
                generation,
                next_free,
            } = *slot
            else {
                unreachable!("free list points at an occupied slot");
            };

            self.free_head = next_free;
            *slot = Slot::Occupied { generation, value };
            return H::from_raw(RawHandle { index, generation });
        }

        let index: u32 = u32::try_from(self.slots.len())
            .ok()
            .filter(|&i| i != u32::MAX)
            .unwrap_or_else(|| panic!("arena exhausted its u32 index space"));
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });

        H::from_raw(RawHandle {
            index,
            generation: 0,
        })
    }

    /// Remove the value behind `handle`, invalidating every copy of it.
    ///
    /// Returns `None` if the handle is stale.
    pub(crate) fn remove(&mut self, handle: H) -> Option<T> {
        let raw: RawHandle = handle.raw();
        let slot: &mut Slot<T> = self.slots.get_mut(raw.index as usize)?;

        match slot {
            Slot::Occupied { generation, .. } if *generation == raw.generation => {}
            _ => return None,
        }

        let vacant = Slot::Vacant {
            generation: raw.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { value, .. } = std::mem::replace(slot, vacant) else {
            return None;
        };

        self.free_head = Some(raw.index);
        self.len -= 1;
        Some(value)
    }

    /// Shared access, `None` for a stale handle.
    #[inline]
    pub(crate) fn get(&self, handle: H) -> Option<&T> {
        let raw: RawHandle = handle.raw();
        match self.slots.get(raw.index as usize)? {
            Slot::Occupied { generation, value } if *generation == raw.generation => Some(value),
            _ => None,
        }
    }

    /// Exclusive access, `None` for a stale handle.
    #[inline]
    pub(crate) fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let raw: RawHandle = handle.raw();
        match self.slots.get_mut(raw.index as usize)? {
            Slot::Occupied { generation, value } if *generation == raw.generation => Some(value),
            _ => None,
        }
    }

    /// Whether `handle` still refers to a live value.
    #[inline]
    pub(crate) fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Exclusive access to two different live values at once.
    ///
    /// # Panics
    ///
    /// Panics if both handles address the same slot or either is stale.
    pub(crate) fn pair_mut(&mut self, a: H, b: H) -> (&mut T, &mut T) {
        let (ra, rb): (RawHandle, RawHandle) = (a.raw(), b.raw());
        assert_ne!(ra.index, rb.index, "pair_mut on a single slot");

        let (lo, hi) = if ra.index < rb.index { (ra, rb) } else { (rb, ra) };
        let split: usize = (hi.index as usize).min(self.slots.len());
        let (head, tail) = self.slots.split_at_mut(split);

        let lo_value: &mut T = Self::occupied(head.get_mut(lo.index as usize), lo);
        let hi_value: &mut T = Self::occupied(tail.first_mut(), hi);

        if ra.index < rb.index {
            (lo_value, hi_value)
        } else {
            (hi_value, lo_value)
        }
    }

    fn occupied(slot: Option<&mut Slot<T>>, raw: RawHandle) -> &mut T {
        match slot {
            Some(Slot::Occupied { generation, value }) if *generation == raw.generation => value,
            _ => panic!("stale arena handle {raw:?}"),
        }
    }

    /// Drop every value. Outstanding handles become stale.
    pub(crate) fn clear(&mut self) {
        // Generations keep counting so pre-clear handles stay stale.
        let mut next_free: Option<u32> = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            let generation: u32 = match slot {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation, .. } => *generation,
            };
            *slot = Slot::Vacant {
                generation,
                next_free,
            };
            next_free = u32::try_from(index).ok();
        }
        self.free_head = next_free;
        self.len = 0;
    }
}

impl<H: ArenaHandle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ArenaHandle, T> Index<H> for Arena<H, T> {
    type Output = T;

    #[inline]
    fn index(&self, handle: H) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {:?}", handle.raw()),
        }
    }
}

impl<H: ArenaHandle, T> IndexMut<H> for Arena<H, T> {
    #[inline]
    fn index_mut(&mut self, handle: H) -> &mut T {
        let raw: RawHandle = handle.raw();
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {raw:?}"),
        }
    }
}

impl<H: ArenaHandle, T: StdFmt::Debug> StdFmt::Debug for Arena<H, T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;

    type TestArena = Arena<ItemId, u64>;

    #[test]
    fn test_insert_and_get() {
        let mut arena = TestArena::new();
        let a = arena.insert(10);
        let b = arena.insert(20);

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&10));
        assert_eq!(arena[b], 20);
    }

    #[test]
    fn test_remove_invalidates_handle() {
        let mut arena = TestArena::new();
        let a = arena.insert(10);

        assert_eq!(arena.remove(a), Some(10));
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn test_reused_slot_rejects_old_handle() {
        let mut arena = TestArena::new();
        let old = arena.insert(1);
        arena.remove(old).unwrap();

        let new = arena.insert(2);
        assert_ne!(old, new);
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut arena = TestArena::new();
        let handles: Vec<ItemId> = (0..8).map(|v| arena.insert(v)).collect();

        arena.clear();
        assert_eq!(arena.len(), 0);
        assert!(handles.iter().all(|&h| !arena.contains(h)));

        // Slots are reused after a clear, with fresh generations.
        let h = arena.insert(99);
        assert_eq!(arena[h], 99);
        assert!(handles.iter().all(|&old| old != h));
    }

    #[test]
    fn test_pair_mut_returns_in_argument_order() {
        let mut arena = TestArena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);

        let (hi, lo) = arena.pair_mut(b, a);
        std::mem::swap(hi, lo);

        assert_eq!(arena[a], 2);
        assert_eq!(arena[b], 1);
    }

    #[test]
    #[should_panic(expected = "pair_mut on a single slot")]
    fn test_pair_mut_rejects_aliasing() {
        let mut arena = TestArena::new();
        let a = arena.insert(1);
        let _ = arena.pair_mut(a, a);
    }

    #[test]
    fn test_dangling_never_resolves() {
        let mut arena = TestArena::new();
        arena.insert(5);
        assert!(arena.get(ItemId::VACANT).is_none());
    }

    #[test]
    #[should_panic(expected = "stale arena handle")]
    fn test_index_panics_on_stale_handle() {
        let mut arena = TestArena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let _ = arena[a];
    }
}
