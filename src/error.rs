//! Error types returned by tree operations.

use std::error::Error as StdError;
use std::fmt as StdFmt;

// ============================================================================
//  ConfigError
// ============================================================================

/// Why a tree configuration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `keys_per_node` is outside
    /// [`MIN_KEYS_PER_NODE`](crate::MIN_KEYS_PER_NODE)..=[`MAX_KEYS_PER_NODE`](crate::MAX_KEYS_PER_NODE).
    CapacityOutOfRange {
        /// The rejected capacity.
        requested: usize,
    },

    /// The builder was finished without a comparator.
    MissingComparator,

    /// The builder was finished without a key extractor.
    MissingKeyExtractor,
}

impl StdFmt::Display for ConfigError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::CapacityOutOfRange { requested } => write!(
                f,
                "keys per node must be within {}..={}, got {requested}",
                crate::MIN_KEYS_PER_NODE,
                crate::MAX_KEYS_PER_NODE
            ),
            Self::MissingComparator => write!(f, "no key comparator configured"),
            Self::MissingKeyExtractor => write!(f, "no key extractor configured"),
        }
    }
}

impl StdError for ConfigError {}

// ============================================================================
//  TreeError
// ============================================================================

/// Error returned by tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// Construction parameters were invalid.
    InvalidConfig(ConfigError),

    /// The tree is unique and already holds an item with an equal key.
    DuplicateKey,

    /// No item with the requested key exists.
    NotFound,

    /// The cursor is in the wrong state for the operation, or refers to a
    /// node that no longer exists.
    InvalidCursor,
}

impl StdFmt::Display for TreeError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "invalid tree configuration: {err}"),
            Self::DuplicateKey => write!(f, "an item with an equal key already exists"),
            Self::NotFound => write!(f, "no item with the given key"),
            Self::InvalidCursor => write!(f, "cursor is not positioned for this operation"),
        }
    }
}

impl StdError for TreeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for TreeError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

// ============================================================================
//  Rejected
// ============================================================================

/// A failed operation that took ownership of an item hands it back here.
///
/// ```
/// use ttree::{TTree, TreeError};
///
/// let mut tree: TTree<u32> = TTree::new();
/// tree.insert(7).unwrap();
///
/// let rejected = tree.insert(7).unwrap_err();
/// assert_eq!(rejected.error, TreeError::DuplicateKey);
/// assert_eq!(rejected.into_item(), 7);
/// ```
pub struct Rejected<T> {
    /// Why the operation failed.
    pub error: TreeError,
    /// The item that was not stored.
    pub item: T,
}

impl<T> Rejected<T> {
    pub(crate) const fn new(error: TreeError, item: T) -> Self {
        Self { error, item }
    }

    /// Take the item back.
    #[must_use]
    pub fn into_item(self) -> T {
        self.item
    }
}

impl<T> StdFmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> StdFmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        StdFmt::Display::fmt(&self.error, f)
    }
}

impl<T> StdError for Rejected<T> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<Rejected<T>> for TreeError {
    fn from(rejected: Rejected<T>) -> Self {
        rejected.error
    }
}

// ============================================================================
//  Tests
// ============================================================================
