//! # `ttree`
//!
//! An ordered, in-memory index based on the T*-tree.
//!
//! A T-tree is a height-balanced (AVL) binary tree whose nodes each hold a
//! bounded, sorted run of keys instead of a single one. The T*-tree variant
//! adds a *successor* link from every node to the node holding the
//! next-greater keys, so in-order scans never climb the tree.
//!
//! - Lookup descends comparing only node minima, then searches one node.
//! - Inserting into a full node evicts its maximum toward the successor
//!   instead of splitting.
//! - Deleting below three-quarters occupancy borrows from the successor or
//!   merges a leaf child, and only ever frees leaves.
//! - Stateful [`Cursor`]s support search-then-insert and positional delete
//!   without a second search.
//!
//! ## Example
//!
//! ```rust
//! use ttree::{CursorStep, TTree};
//!
//! let mut tree: TTree<u32> = TTree::new();
//! for value in [30, 10, 20] {
//!     tree.insert(value).unwrap();
//! }
//!
//! // Search, then insert at the position the search found.
//! let (hit, mut cursor) = tree.lookup(&15);
//! assert!(hit.is_none());
//! tree.insert_at_cursor(&mut cursor, 15).unwrap();
//!
//! // Walk forward from the inserted item.
//! let mut seen = vec![*tree.cursor_item(&cursor).unwrap()];
//! while tree.cursor_next(&mut cursor) == CursorStep::Ok {
//!     seen.push(*tree.cursor_item(&cursor).unwrap());
//! }
//! assert_eq!(seen, vec![15, 20, 30]);
//! ```
//!
//! ## Keys
//!
//! Items carry their own key. A tree is built with a comparator over the
//! key type `K` and an extractor borrowing the key out of an item `T`; see
//! [`TreeBuilder`]. For plain `Ord` values [`TTree::new`] uses the value as
//! its own key.
//!
//! ## Thread Safety
//!
//! The tree has no internal synchronization. It is `Send`/`Sync` when `T`
//! is, and mutation needs `&mut self`.
//!
//! ## Logging
//!
//! With the `tracing` feature, structural events (node attach/removal,
//! rotations, key migration, merges) are emitted through `tracing` under
//! the `ttree` target.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod alloc;
mod config;
mod cursor;
mod error;
mod node;
mod tracing_helpers;
mod tree;

pub use alloc::NodeId;
pub use config::{
    CompareFn, DEFAULT_KEYS_PER_NODE, KeyFn, MAX_KEYS_PER_NODE, MIN_KEYS_PER_NODE, TreeBuilder,
    TreeConfig,
};
pub use cursor::{Cursor, CursorSide, CursorState, CursorStep, Seek};
pub use error::{ConfigError, Rejected, TreeError};
pub use node::Side;
pub use tree::{InvariantViolation, Iter, NodeView, TTree, TreeDump};
