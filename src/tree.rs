//! Filepath: src/tree.rs
//! `TTree` - an ordered, in-memory T*-tree.
//!
//! This module holds the tree type and its construction; the algorithms
//! live in submodules:
//!
//! | Module | Operations |
//! |--------|------------|
//! | `lookup` | two-phase search, `get`, `contains_key` |
//! | `insert` | `insert`, `insert_at_cursor` |
//! | `delete` | `delete`, `delete_at_cursor`, `replace` |
//! | `balance` | rotations, T-tree key migration, balance fixups |
//! | `successor` | maintenance of the in-order node chain |
//! | `navigate` | cursor open / first / last / next / prev |
//! | `iter` | borrowing iterator over the successor chain |
//! | `diagnostics` | node inspection, depth, invariant checks, dump |

use std::cmp::Ordering;
use std::fmt as StdFmt;

use crate::alloc::{Arena, ItemId, NodeId};
use crate::config::{CompareFn, KeyFn, TreeBuilder, TreeConfig};
use crate::error::TreeError;
use crate::node::Node;
use crate::tracing_helpers::debug_log;

mod balance;
mod delete;
mod diagnostics;
mod insert;
mod iter;
mod lookup;
mod navigate;
mod successor;

pub use diagnostics::{InvariantViolation, NodeView, TreeDump};
pub use iter::Iter;

// ============================================================================
//  TTree
// ============================================================================

/// An ordered collection of items indexed by a key embedded in each item.
///
/// Items are grouped into nodes of up to `keys_per_node` sorted entries and
/// the nodes form an AVL-balanced binary tree. Every node also links to the
/// node holding the next-greater keys, so in-order traversal never climbs
/// the tree.
///
/// `K` is the key type the comparator works on; for trees of plain `Ord`
/// values it defaults to the item type itself.
///
/// # Example
///
/// ```
/// use ttree::TTree;
///
/// let mut tree: TTree<u32> = TTree::new();
/// for value in [50, 10, 40, 20, 30] {
///     tree.insert(value).unwrap();
/// }
///
/// assert_eq!(tree.len(), 5);
/// assert_eq!(tree.get(&40), Some(&40));
/// assert_eq!(tree.delete(&10), Some(10));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![20, 30, 40, 50]);
/// ```
///
/// # Ownership
///
/// The tree owns its items. They are handed back by `delete`,
/// `delete_at_cursor`, `replace` and failed inserts, and dropped with the
/// tree or by [`clear`](Self::clear).
pub struct TTree<T, K: ?Sized = T> {
    config: TreeConfig,
    compare: CompareFn<K>,
    key_of: KeyFn<T, K>,
    nodes: Arena<NodeId, Node>,
    items: Arena<ItemId, T>,
    root: Option<NodeId>,
}

#[inline]
const fn identity<T>(item: &T) -> &T {
    item
}

impl<T: Ord> TTree<T> {
    /// Empty unique tree with default capacity, ordered by `T: Ord`.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(TreeConfig::default(), T::cmp, identity::<T>)
    }

    /// Empty tree of `Ord` values with the given configuration.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidConfig`] if `keys_per_node` is out of range.
    pub fn with_ord_config(config: TreeConfig) -> Result<Self, TreeError> {
        Self::with_config(config, T::cmp, identity::<T>)
    }
}

impl<T: Ord> Default for TTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: ?Sized> TTree<T, K> {
    /// Start building a tree with a custom comparator and key extractor.
    #[must_use]
    pub fn builder() -> TreeBuilder<T, K> {
        TreeBuilder::new()
    }

    /// Empty tree with explicit configuration, comparator and key extractor.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidConfig`] if `keys_per_node` is out of range.
    pub fn with_config(
        config: TreeConfig,
        compare: CompareFn<K>,
        key_of: KeyFn<T, K>,
    ) -> Result<Self, TreeError> {
        config.validate()?;
        debug_log!(
            keys_per_node = config.keys_per_node,
            unique = config.unique,
            "tree created"
        );
        Ok(Self::from_parts(config, compare, key_of))
    }

    const fn from_parts(config: TreeConfig, compare: CompareFn<K>, key_of: KeyFn<T, K>) -> Self {
        Self {
            config,
            compare,
            key_of,
            nodes: Arena::new(),
            items: Arena::new(),
            root: None,
        }
    }

    /// Number of stored items.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// No items stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Key slots per node.
    #[inline]
    #[must_use]
    pub const fn keys_per_node(&self) -> usize {
        self.config.keys_per_node
    }

    /// Whether equal keys are rejected.
    #[inline]
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.config.unique
    }

    /// The plain configuration values.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> TreeConfig {
        self.config
    }

    /// Drop every item and node. Outstanding cursors and node handles
    /// become stale.
    pub fn clear(&mut self) {
        debug_log!(items = self.items.len(), nodes = self.nodes.len(), "tree cleared");
        self.nodes.clear();
        self.items.clear();
        self.root = None;
    }

    // ========================================================================
    //  Key access
    // ========================================================================

    #[inline]
    fn key_of_item(&self, item: ItemId) -> &K {
        (self.key_of)(&self.items[item])
    }

    /// Compare a probe key with the key of a stored item.
    #[inline]
    fn compare_to(&self, key: &K, item: ItemId) -> Ordering {
        (self.compare)(key, self.key_of_item(item))
    }

    /// Whether `node` is a live node of this tree.
    #[inline]
    fn is_live(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// Walk left links from `node` to the node with the smallest keys of
    /// its subtree.
    fn subtree_min(&self, mut node: NodeId) -> NodeId {
        while let Some(left) = self.nodes[node].left {
            node = left;
        }
        node
    }

    /// Walk right links from `node` to the node with the greatest keys of
    /// its subtree.
    fn subtree_max(&self, mut node: NodeId) -> NodeId {
        while let Some(right) = self.nodes[node].right {
            node = right;
        }
        node
    }
}

impl<T, K> StdFmt::Debug for TTree<T, K>
where
    T: StdFmt::Debug,
    K: ?Sized,
{
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, K: ?Sized> IntoIterator for &'a TTree<T, K> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_is_empty() {
        let tree: TTree<u64> = TTree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.keys_per_node(), 8);
        assert!(tree.is_unique());
        assert_eq!(tree.depth(), 0);
        assert!(tree.root().is_none());
    }

    #[test]
    fn test_with_config_validates() {
        let err = TTree::<u64>::with_ord_config(TreeConfig::new(1, true)).err();
        assert!(matches!(err, Some(TreeError::InvalidConfig(_))));

        let tree = TTree::<u64>::with_ord_config(TreeConfig::new(2, false)).unwrap();
        assert_eq!(tree.keys_per_node(), 2);
        assert!(!tree.is_unique());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut tree: TTree<u64> = TTree::new();
        for i in 0..100 {
            tree.insert(i).unwrap();
        }
        let stale = tree.root().unwrap();

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.node(stale).is_none());
        assert_eq!(tree.iter().count(), 0);

        tree.insert(5).unwrap();
        assert_eq!(tree.get(&5), Some(&5));
    }

    #[test]
    fn test_debug_lists_items_in_order() {
        let mut tree: TTree<u8> = TTree::new();
        for i in [3, 1, 2] {
            tree.insert(i).unwrap();
        }
        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }

    #[test]
    fn test_custom_key_extractor() {
        #[derive(Debug, PartialEq)]
        struct Row {
            id: u32,
            name: &'static str,
        }

        let mut tree = TTree::<Row, u32>::builder()
            .keys_per_node(4)
            .comparator(u32::cmp)
            .key(|row| &row.id)
            .build()
            .unwrap();

        tree.insert(Row { id: 2, name: "b" }).unwrap();
        tree.insert(Row { id: 1, name: "a" }).unwrap();

        assert_eq!(tree.get(&1).map(|r| r.name), Some("a"));
        assert_eq!(tree.first().map(|r| r.id), Some(1));
        assert_eq!(tree.last().map(|r| r.id), Some(2));
    }

    #[test]
    fn test_reverse_comparator() {
        let mut tree = TTree::<i32, i32>::builder()
            .comparator(|a, b| b.cmp(a))
            .key(|v| v)
            .build()
            .unwrap();

        for i in 0..20 {
            tree.insert(i).unwrap();
        }
        let items: Vec<i32> = tree.iter().copied().collect();
        let expected: Vec<i32> = (0..20).rev().collect();
        assert_eq!(items, expected);
    }

    #[test]
    fn test_str_keys() {
        let mut tree = TTree::<String, str>::builder()
            .comparator(|a, b| a.cmp(b))
            .key(String::as_str)
            .build()
            .unwrap();

        tree.insert("pear".to_owned()).unwrap();
        tree.insert("apple".to_owned()).unwrap();

        assert!(tree.contains_key("apple"));
        assert_eq!(tree.first().map(String::as_str), Some("apple"));
    }
}
