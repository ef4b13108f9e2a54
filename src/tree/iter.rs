//! Borrowing iteration in key order.

use std::iter::FusedIterator;

use super::TTree;
use crate::alloc::NodeId;

/// Iterator over a tree's items in ascending key order.
///
/// Created by [`TTree::iter`]. Walks the successor chain from the leftmost
/// node, so the whole traversal costs one pass over the nodes.
pub struct Iter<'a, T, K: ?Sized> {
    tree: &'a TTree<T, K>,
    node: Option<NodeId>,
    idx: usize,
    remaining: usize,
}

impl<T, K: ?Sized> TTree<T, K> {
    /// Items in ascending key order.
    pub fn iter(&self) -> Iter<'_, T, K> {
        let node: Option<NodeId> = self.root.map(|root| self.subtree_min(root));
        Iter {
            tree: self,
            node,
            idx: node.map_or(0, |id| self.nodes[id].min_idx()),
            remaining: self.len(),
        }
    }
}

impl<'a, T, K: ?Sized> Iterator for Iter<'a, T, K> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree: &'a TTree<T, K> = self.tree;
        loop {
            let node = &tree.nodes[self.node?];
            if self.idx < node.end {
                let item = node.key(self.idx);
                self.idx += 1;
                self.remaining -= 1;
                return Some(&tree.items[item]);
            }

            self.node = node.successor;
            if let Some(next) = self.node {
                self.idx = tree.nodes[next].min_idx();
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, K: ?Sized> ExactSizeIterator for Iter<'_, T, K> {}

impl<T, K: ?Sized> FusedIterator for Iter<'_, T, K> {}

impl<T, K: ?Sized> Clone for Iter<'_, T, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            node: self.node,
            idx: self.idx,
            remaining: self.remaining,
        }
    }
}
