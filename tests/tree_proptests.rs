//! Property-based tests for `TTree`.
//!
//! Random operation sequences run against both the tree and a `BTreeMap`
//! oracle, across node capacities; after every mutation the tree's
//! structural invariants are re-checked.

#![expect(clippy::unwrap_used, reason = "fail fast in tests")]

mod common;

use std::collections::BTreeMap;

use common::{Record, assert_valid, int_tree, record_tree};
use proptest::prelude::*;
use ttree::{CursorStep, TTree, TreeConfig, TreeError};

// ============================================================================
//  Strategies
// ============================================================================

/// Node capacities worth exploring: the minimum, odd sizes, the default,
/// and one large enough that most trees stay a single node.
fn capacity() -> impl Strategy<Value = usize> {
    prop_oneof![Just(2usize), Just(3), 4usize..=9, Just(16), Just(64)]
}

/// Small key space so sequences hit duplicates and deletes of live keys.
fn key() -> impl Strategy<Value = i64> {
    -200i64..200
}

/// Operations for random testing.
#[derive(Debug, Clone)]
enum Op {
    Insert(i64),
    Delete(i64),
    Lookup(i64),
    /// Search, then insert through the returned cursor.
    CursorInsert(i64),
    /// Search, then delete through the returned cursor.
    CursorDelete(i64),
}

fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => key().prop_map(Op::Insert),
            3 => key().prop_map(Op::Delete),
            2 => key().prop_map(Op::Lookup),
            1 => key().prop_map(Op::CursorInsert),
            1 => key().prop_map(Op::CursorDelete),
        ],
        0..=max_ops,
    )
}

/// Apply `op` to both the tree and the oracle, asserting they agree.
fn apply(tree: &mut TTree<i64>, oracle: &mut BTreeMap<i64, ()>, op: &Op) -> Result<(), TestCaseError> {
    match *op {
        Op::Insert(k) => {
            let result = tree.insert(k);
            let fresh = oracle.insert(k, ()).is_none();
            prop_assert_eq!(result.is_ok(), fresh);
            if let Err(rejected) = result {
                prop_assert_eq!(rejected.error, TreeError::DuplicateKey);
                prop_assert_eq!(rejected.item, k);
            }
        }
        Op::Delete(k) => {
            prop_assert_eq!(tree.delete(&k), oracle.remove(&k).map(|()| k));
        }
        Op::Lookup(k) => {
            let (hit, cursor) = tree.lookup(&k);
            prop_assert_eq!(hit.copied(), oracle.contains_key(&k).then_some(k));
            prop_assert_eq!(cursor.is_opened(), hit.is_some());
        }
        Op::CursorInsert(k) => {
            let (hit, mut cursor) = tree.lookup(&k);
            if hit.is_none() {
                tree.insert_at_cursor(&mut cursor, k).unwrap();
                prop_assert_eq!(tree.cursor_item(&cursor), Some(&k));
                oracle.insert(k, ());
            }
        }
        Op::CursorDelete(k) => {
            let (hit, mut cursor) = tree.lookup(&k);
            if hit.is_some() {
                prop_assert_eq!(tree.delete_at_cursor(&mut cursor), Ok(k));
                prop_assert!(cursor.is_closed());
                oracle.remove(&k);
            } else {
                prop_assert_eq!(tree.delete_at_cursor(&mut cursor), Err(TreeError::InvalidCursor));
            }
        }
    }
    Ok(())
}

// ============================================================================
//  Differential Testing Against BTreeMap
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Random operations agree with the oracle and keep every invariant.
    #[test]
    fn differential_random_ops(keys_per_node in capacity(), ops in operations(200)) {
        let mut tree: TTree<i64> = TTree::with_ord_config(TreeConfig::new(keys_per_node, true)).unwrap();
        let mut oracle: BTreeMap<i64, ()> = BTreeMap::new();

        for op in &ops {
            apply(&mut tree, &mut oracle, op)?;
            prop_assert!(tree.validate().is_ok(), "{:?} after {:?}\n{}", tree.validate(), op, tree.dump());
        }

        prop_assert_eq!(tree.len(), oracle.len());
        let items: Vec<i64> = tree.iter().copied().collect();
        let expected: Vec<i64> = oracle.keys().copied().collect();
        prop_assert_eq!(items, expected);
    }

    /// Lookup of every key in range matches the oracle after bulk insert.
    #[test]
    fn differential_lookup(keys_per_node in capacity(), keys in prop::collection::btree_set(key(), 0..150)) {
        let tree = int_tree(keys_per_node, keys.iter().copied());

        for probe in -205i64..205 {
            prop_assert_eq!(tree.get(&probe).copied(), keys.get(&probe).copied());
        }
        assert_valid(&tree);
    }
}

// ============================================================================
//  Cursor Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// From a pending cursor, `next` reaches the least greater key and
    /// `prev` the greatest smaller key.
    #[test]
    fn pending_cursor_brackets_missing_key(
        keys_per_node in capacity(),
        keys in prop::collection::btree_set(key(), 1..120),
        probe in key(),
    ) {
        prop_assume!(!keys.contains(&probe));
        let tree = int_tree(keys_per_node, keys.iter().copied());
        let (hit, pending) = tree.lookup(&probe);
        prop_assert!(hit.is_none());
        prop_assert!(pending.is_pending());

        let mut forward = pending;
        let above = keys.range(probe..).next().copied();
        if let Some(expected) = above {
            prop_assert_eq!(tree.cursor_next(&mut forward), CursorStep::Ok);
            prop_assert_eq!(tree.cursor_item(&forward).copied(), Some(expected));
        } else {
            prop_assert_eq!(tree.cursor_next(&mut forward), CursorStep::End);
        }

        let mut backward = pending;
        let below = keys.range(..probe).next_back().copied();
        if let Some(expected) = below {
            prop_assert_eq!(tree.cursor_prev(&mut backward), CursorStep::Ok);
            prop_assert_eq!(tree.cursor_item(&backward).copied(), Some(expected));
        } else {
            prop_assert_eq!(tree.cursor_prev(&mut backward), CursorStep::End);
        }
    }

    /// Walking forward from any key and backward from the same key covers
    /// the whole set exactly once.
    #[test]
    fn bidirectional_walk_covers_all(
        keys_per_node in capacity(),
        keys in prop::collection::btree_set(key(), 1..150),
        start_at in any::<prop::sample::Index>(),
    ) {
        let tree = int_tree(keys_per_node, keys.iter().copied());
        let all: Vec<i64> = keys.iter().copied().collect();
        let start = all[start_at.index(all.len())];

        let (_, origin) = tree.lookup(&start);
        let mut seen = vec![start];

        let mut cursor = origin;
        while tree.cursor_next(&mut cursor) == CursorStep::Ok {
            seen.push(*tree.cursor_item(&cursor).unwrap());
        }
        let mut cursor = origin;
        while tree.cursor_prev(&mut cursor) == CursorStep::Ok {
            seen.push(*tree.cursor_item(&cursor).unwrap());
        }

        seen.sort_unstable();
        prop_assert_eq!(seen, all);
    }
}

// ============================================================================
//  Duplicates and Custom Keys
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A non-unique tree keeps every copy and deletes them one at a time.
    #[test]
    fn duplicates_are_counted(keys_per_node in capacity(), ids in prop::collection::vec(0u64..30, 0..150)) {
        let mut tree = record_tree(keys_per_node, false);
        let mut counts: BTreeMap<u64, usize> = BTreeMap::new();

        for &id in &ids {
            tree.insert(Record::new(id)).unwrap();
            *counts.entry(id).or_default() += 1;
        }
        assert_valid(&tree);
        prop_assert_eq!(tree.len(), ids.len());

        let listed: Vec<u64> = tree.iter().map(|r| r.id).collect();
        let expected: Vec<u64> = counts.iter().flat_map(|(&id, &n)| std::iter::repeat_n(id, n)).collect();
        prop_assert_eq!(listed, expected);

        for (&id, &n) in &counts {
            for _ in 0..n {
                prop_assert_eq!(tree.delete(&id).map(|r| r.id), Some(id));
            }
            prop_assert!(tree.delete(&id).is_none());
            assert_valid(&tree);
        }
        prop_assert!(tree.is_empty());
    }

    /// Replace swaps the stored record and leaves ordering untouched.
    #[test]
    fn replace_keeps_order(keys_per_node in capacity(), ids in prop::collection::btree_set(0u64..500, 1..100)) {
        let mut tree = record_tree(keys_per_node, true);
        for &id in &ids {
            tree.insert(Record::new(id)).unwrap();
        }

        for &id in &ids {
            let updated = Record { id, payload: format!("updated-{id}") };
            let old = tree.replace(&id, updated).unwrap();
            prop_assert_eq!(old, Record::new(id));
        }

        prop_assert!(tree.iter().all(|r| r.payload.starts_with("updated-")));
        let listed: Vec<u64> = tree.iter().map(|r| r.id).collect();
        prop_assert_eq!(listed, ids.iter().copied().collect::<Vec<_>>());
        assert_valid(&tree);
    }
}

// ============================================================================
//  Stress
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    /// Long runs on the smallest capacity, where nearly every operation
    /// changes the tree shape.
    #[test]
    fn stress_minimum_capacity(ops in operations(1500)) {
        common::init_tracing();
        let mut tree: TTree<i64> = TTree::with_ord_config(TreeConfig::new(2, true)).unwrap();
        let mut oracle: BTreeMap<i64, ()> = BTreeMap::new();

        for op in &ops {
            apply(&mut tree, &mut oracle, op)?;
        }

        assert_valid(&tree);
        let items: Vec<i64> = tree.iter().copied().collect();
        prop_assert_eq!(items, oracle.keys().copied().collect::<Vec<_>>());
    }
}
