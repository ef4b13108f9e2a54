//! Tree construction parameters.
//!
//! A tree is described by two plain values, the node capacity and whether
//! equal keys are rejected, plus two function pointers that define the key
//! space: a comparator and a key extractor. [`TreeConfig`] carries the plain
//! values; [`TreeBuilder`] collects all four and validates them.

use std::cmp::Ordering;
use std::fmt as StdFmt;

use crate::TTree;
use crate::error::{ConfigError, TreeError};

/// Node capacity used when none is configured.
pub const DEFAULT_KEYS_PER_NODE: usize = 8;

/// Smallest accepted node capacity.
pub const MIN_KEYS_PER_NODE: usize = 2;

/// Largest accepted node capacity.
pub const MAX_KEYS_PER_NODE: usize = 4096;

/// Three-way comparison of two keys. Must be a total order.
pub type CompareFn<K> = fn(&K, &K) -> Ordering;

/// Borrow the key embedded in an item.
pub type KeyFn<T, K> = fn(&T) -> &K;

// ============================================================================
//  TreeConfig
// ============================================================================

/// Plain configuration values of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Key slots per node.
    pub keys_per_node: usize,

    /// Reject items whose key equals one already stored.
    pub unique: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            keys_per_node: DEFAULT_KEYS_PER_NODE,
            unique: true,
        }
    }
}

impl TreeConfig {
    /// Configuration with the given capacity and uniqueness.
    #[must_use]
    pub const fn new(keys_per_node: usize, unique: bool) -> Self {
        Self {
            keys_per_node,
            unique,
        }
    }

    /// Check the capacity bounds.
    ///
    /// # Errors
    ///
    /// [`ConfigError::CapacityOutOfRange`] if `keys_per_node` is outside
    /// `MIN_KEYS_PER_NODE..=MAX_KEYS_PER_NODE`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.keys_per_node < MIN_KEYS_PER_NODE || self.keys_per_node > MAX_KEYS_PER_NODE {
            return Err(ConfigError::CapacityOutOfRange {
                requested: self.keys_per_node,
            });
        }
        Ok(())
    }

    /// Slot a new node's only key is placed at: just left of the middle, so
    /// the window can grow either way.
    #[inline]
    pub(crate) const fn first_slot(&self) -> usize {
        self.keys_per_node / 2 - 1
    }

    /// A node holding more keys than this after a delete needs no repair.
    #[inline]
    pub(crate) const fn min_occupancy(&self) -> usize {
        self.keys_per_node - self.keys_per_node / 4
    }
}

// ============================================================================
//  TreeBuilder
// ============================================================================

/// Step-by-step construction of a [`TTree`].
///
/// ```
/// use ttree::TTree;
///
/// struct Account {
///     id: u64,
///     balance: i64,
/// }
///
/// let mut accounts = TTree::<Account, u64>::builder()
///     .keys_per_node(16)
///     .comparator(|a, b| a.cmp(b))
///     .key(|account| &account.id)
///     .build()
///     .unwrap();
///
/// accounts.insert(Account { id: 7, balance: 100 }).unwrap();
/// assert_eq!(accounts.get(&7).map(|a| a.balance), Some(100));
/// ```
pub struct TreeBuilder<T, K: ?Sized> {
    config: TreeConfig,
    compare: Option<CompareFn<K>>,
    key_of: Option<KeyFn<T, K>>,
}

impl<T, K: ?Sized> TreeBuilder<T, K> {
    /// Builder with default configuration and no comparator or extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: TreeConfig::default(),
            compare: None,
            key_of: None,
        }
    }

    /// Key slots per node.
    #[must_use]
    pub const fn keys_per_node(mut self, keys_per_node: usize) -> Self {
        self.config.keys_per_node = keys_per_node;
        self
    }

    /// Whether equal keys are rejected. Defaults to `true`.
    #[must_use]
    pub const fn unique(mut self, unique: bool) -> Self {
        self.config.unique = unique;
        self
    }

    /// Replace the plain configuration values at once.
    #[must_use]
    pub const fn config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    /// Key comparator.
    #[must_use]
    pub fn comparator(mut self, compare: CompareFn<K>) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Key extractor.
    #[must_use]
    pub fn key(mut self, key_of: KeyFn<T, K>) -> Self {
        self.key_of = Some(key_of);
        self
    }

    /// Validate and construct an empty tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidConfig`] if the capacity is out of range or the
    /// comparator or key extractor is missing.
    pub fn build(self) -> Result<TTree<T, K>, TreeError> {
        let compare: CompareFn<K> = self.compare.ok_or(ConfigError::MissingComparator)?;
        let key_of: KeyFn<T, K> = self.key_of.ok_or(ConfigError::MissingKeyExtractor)?;
        TTree::with_config(self.config, compare, key_of)
    }
}

impl<T, K: ?Sized> Default for TreeBuilder<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: ?Sized> StdFmt::Debug for TreeBuilder<T, K> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("TreeBuilder")
            .field("config", &self.config)
            .field("comparator", &self.compare.is_some())
            .field("key", &self.key_of.is_some())
            .finish()
    }
}

// ============================================================================
//  Tests
// ============================================================================
