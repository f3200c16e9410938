extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

fn init_logging() {
    use simplelog::{Config, LevelFilter, TestLogger};

    // Another test may have installed the logger already.
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

fn tree_of(keys: &[u32]) -> RbTree<TestNode> {
    let mut tree = RbTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key, key * 3)).is_none());
        tree.assert_invariants();
    }

    tree
}

fn keys_of(tree: &RbTree<TestNode>) -> Vec<u32> {
    tree.iter().map(|node| node.key).collect()
}

// Pre-order (key, color, parent key) triples, which pin down the exact shape of the tree.
fn shape_of(tree: &RbTree<TestNode>) -> Vec<(u32, Color, Option<u32>)> {
    fn walk(node: Link<TestNode>, out: &mut Vec<(u32, Color, Option<u32>)>) {
        let Some(node) = node else {
            return;
        };

        unsafe {
            let links = TestNode::links(node).as_ref();
            let parent = links.parent().map(|p| p.as_ref().key);
            out.push((node.as_ref().key, links.color(), parent));

            walk(links.left(), out);
            walk(links.right(), out);
        }
    }

    let mut out = Vec::new();
    walk(tree.root, &mut out);
    out
}

fn ptr_to(tree: &RbTree<TestNode>, key: u32) -> NonNull<TestNode> {
    tree.get_raw(&key).expect("item not found")
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        let node = tree.get(key).expect("item not found");
        assert_eq!(node.key, *key);
        assert_eq!(node.value, key * 3);
    }

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    assert_eq!(keys_of(&tree), sorted);
}

// Calls `f` with every permutation of `0..n`.
fn for_each_permutation(n: u32, f: &mut dyn FnMut(&[u32])) {
    fn permute(keys: &mut Vec<u32>, k: usize, f: &mut dyn FnMut(&[u32])) {
        if k == keys.len() {
            f(keys);
            return;
        }

        for i in k..keys.len() {
            keys.swap(k, i);
            permute(keys, k + 1, f);
            keys.swap(k, i);
        }
    }

    let mut keys: Vec<u32> = (0..n).collect();
    permute(&mut keys, 0, f);
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);

    let tree: RbTree<TestNode> = RbTree::new();
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
    assert!(tree.first().is_none());
    assert!(tree.last().is_none());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.black_height(None), 0);
}

#[test]
fn single_elem_is_black_root() {
    let tree = tree_of(&[10]);

    let root = tree.root().expect("tree has a root");
    assert_eq!(root.key, 10);
    assert_eq!(tree.color(&root), Color::Black);
    assert_eq!(keys_of(&tree), [10]);
    assert_eq!(tree.height(), 1);
}

#[test]
fn ascending_three_rotates_left() {
    init_logging();
    let tree = tree_of(&[10, 20, 30]);

    let root = tree.root().expect("tree has a root");
    assert_eq!(root.key, 20);
    assert_eq!(tree.color(&root), Color::Black);
    assert_eq!(tree.height(), 2);
    assert_eq!(keys_of(&tree), [10, 20, 30]);

    assert_eq!(
        shape_of(&tree),
        [
            (20, Color::Black, None),
            (10, Color::Red, Some(20)),
            (30, Color::Red, Some(20)),
        ]
    );
}

#[test]
fn descending_three_rotates_right() {
    let tree = tree_of(&[30, 20, 10]);

    assert_eq!(
        shape_of(&tree),
        [
            (20, Color::Black, None),
            (10, Color::Red, Some(20)),
            (30, Color::Red, Some(20)),
        ]
    );
}

#[test]
fn inner_child_rotates_twice() {
    init_logging();

    // Left family: 20 is the right child of 10, which is the left child of 30.
    let tree = tree_of(&[30, 10, 20]);
    assert_eq!(tree.root().map(|root| root.key), Some(20));
    assert_eq!(
        shape_of(&tree),
        [
            (20, Color::Black, None),
            (10, Color::Red, Some(20)),
            (30, Color::Red, Some(20)),
        ]
    );

    // Right family: the mirror image.
    let tree = tree_of(&[10, 30, 20]);
    assert_eq!(tree.root().map(|root| root.key), Some(20));
    assert_eq!(
        shape_of(&tree),
        [
            (20, Color::Black, None),
            (10, Color::Red, Some(20)),
            (30, Color::Red, Some(20)),
        ]
    );
}

#[test]
fn red_uncle_recolors() {
    let mut tree = tree_of(&[20, 10, 30]);

    // Both children of the root are red, so inserting below one of them recolors.
    tree.insert(TestNode::new(5, 15));
    tree.assert_invariants();

    assert_eq!(
        shape_of(&tree),
        [
            (20, Color::Black, None),
            (10, Color::Black, Some(20)),
            (5, Color::Red, Some(10)),
            (30, Color::Black, Some(20)),
        ]
    );
    assert_eq!(tree.black_height(tree.root().as_deref()), 2);
}

#[test]
fn duplicate_insert_is_inert() {
    init_logging();
    let mut tree = tree_of(&[40, 15, 60, 10, 50]);

    let shape = shape_of(&tree);
    let len = tree.len();

    let rejected = tree.insert(TestNode::new(15, 999)).expect("duplicate key was inserted");
    assert_eq!((rejected.key, rejected.value), (15, 999));

    assert_eq!(shape_of(&tree), shape);
    assert_eq!(tree.len(), len);
    assert_eq!(tree.get(&15).map(|node| node.value), Some(45));
    tree.assert_invariants();
}

#[test]
fn search_matches_key_and_value() {
    let tree = tree_of(&[5, 3, 8, 1, 4]);

    let hit = tree.search(&TestNode::new(4, 12)).expect("node not found");
    assert_eq!((hit.key, hit.value), (4, 12));

    // A key match with a different value is not a match, though the key is present.
    assert!(tree.search(&TestNode::new(4, 13)).is_none());
    assert_eq!(tree.get(&4).map(|n| n.value), Some(12));

    assert!(tree.search(&TestNode::new(7, 21)).is_none());
}

#[test]
fn missing_key_leaves_tree_unmodified() {
    let tree = tree_of(&[2, 4, 6, 8]);
    let shape = shape_of(&tree);

    assert!(tree.get(&5).is_none());
    assert!(!tree.contains_key(&5));
    assert!(tree.search(&TestNode::new(5, 15)).is_none());

    assert_eq!(shape_of(&tree), shape);
    assert_eq!(tree.len(), 4);
}

#[test]
fn every_small_permutation() {
    for n in 0..=6 {
        for_each_permutation(n, &mut |keys: &[u32]| insert_find_all(keys));
    }
}

#[test]
fn ascending_keys_stay_balanced() {
    let mut tree: RbTree<TestNode> = RbTree::new();

    for key in 0..1000 {
        tree.insert(TestNode::new(key, key));
    }
    tree.assert_invariants();

    // 2 * log2(1001) < 20.
    assert!(tree.height() <= 19, "height {}", tree.height());
    assert_eq!(keys_of(&tree), (0..1000).collect::<Vec<_>>());
    assert_eq!(tree.first().map(|node| node.key), Some(0));
    assert_eq!(tree.last().map(|node| node.key), Some(999));
}

#[test]
fn black_height_counts_nil_leaves() {
    let tree = tree_of(&[20, 10, 30, 5]);

    let leaf = tree.get(&5).expect("item not found");
    assert_eq!(tree.color(&leaf), Color::Red);
    assert_eq!(tree.black_height(Some(&*leaf)), 1);

    // 30 is a black leaf: only its nil leaves count.
    let black_leaf = tree.get(&30).expect("item not found");
    assert_eq!(tree.color(&black_leaf), Color::Black);
    assert_eq!(tree.black_height(Some(&*black_leaf)), 1);

    // Root -> 10 (black) -> nil.
    assert_eq!(tree.black_height(tree.root().as_deref()), 2);
}

#[test]
fn rotations_preserve_order() {
    let keys = [50, 30, 70, 20, 40, 60, 80, 35, 45];
    let mut tree = tree_of(&keys);

    let before_keys = keys_of(&tree);
    let before_shape = shape_of(&tree);

    unsafe {
        let pivot = ptr_to(&tree, 30);

        tree.rotate_left(pivot);
        assert_eq!(keys_of(&tree), before_keys);
        assert_eq!(
            TestNode::links(ptr_to(&tree, 30)).as_ref().parent(),
            Some(ptr_to(&tree, 40))
        );

        // Rotating right at the new subtree root undoes the rotation.
        tree.rotate_right(ptr_to(&tree, 40));
        assert_eq!(keys_of(&tree), before_keys);
    }

    assert_eq!(shape_of(&tree), before_shape);
    tree.assert_invariants();
}

#[test]
fn rotation_at_root_moves_root() {
    let mut tree = tree_of(&[20, 10, 30]);

    unsafe { tree.rotate_right(ptr_to(&tree, 20)) };
    assert_eq!(tree.root().map(|root| root.key), Some(10));
    assert_eq!(keys_of(&tree), [10, 20, 30]);

    unsafe { tree.rotate_left(ptr_to(&tree, 10)) };
    assert_eq!(tree.root().map(|root| root.key), Some(20));
    assert!(unsafe { TestNode::links(ptr_to(&tree, 20)).as_ref().parent() }.is_none());
    tree.assert_invariants();
}

#[test]
fn rotation_without_child_is_noop() {
    let mut tree = tree_of(&[20, 10, 30]);
    let shape = shape_of(&tree);

    unsafe {
        // Leaves have neither child.
        tree.rotate_left(ptr_to(&tree, 10));
        tree.rotate_right(ptr_to(&tree, 30));
    }

    assert_eq!(shape_of(&tree), shape);
}

#[test]
fn iter_is_double_ended() {
    let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 7);
    assert_eq!(iter.next().map(|n| n.key), Some(1));
    assert_eq!(iter.next_back().map(|n| n.key), Some(7));
    assert_eq!(iter.len(), 5);

    let middle: Vec<u32> = iter.map(|n| n.key).collect();
    assert_eq!(middle, [2, 3, 4, 5, 6]);

    let reversed: Vec<u32> = tree.iter().rev().map(|n| n.key).collect();
    assert_eq!(reversed, [7, 6, 5, 4, 3, 2, 1]);

    // Traversal is restartable.
    assert_eq!(keys_of(&tree), keys_of(&tree));
    assert_eq!((&tree).into_iter().count(), 7);
}

#[test]
fn cursor_wraps_through_ghost() {
    let tree = tree_of(&[2, 1, 3]);

    let mut cursor = tree.cursor_first();
    assert_eq!(cursor.get().map(|n| n.key), Some(1));
    assert!(cursor.peek_prev().is_none());

    cursor.move_prev();
    assert!(cursor.get().is_none());
    assert_eq!(cursor.peek_next().map(|n| n.key), Some(1));
    assert_eq!(cursor.peek_prev().map(|n| n.key), Some(3));

    cursor.move_prev();
    assert_eq!(cursor.get().map(|n| n.key), Some(3));

    let mut cursor = tree.cursor_last();
    assert_eq!(cursor.get().map(|n| n.key), Some(3));
    cursor.move_next();
    assert!(cursor.get().is_none());
}

#[test]
fn cursor_reports_color_and_black_height() {
    // 20 and 30 are black, 10 is black with a red left child 5.
    let tree = tree_of(&[20, 10, 30, 5]);

    let mut seen = Vec::new();
    let mut cursor = tree.cursor_first();
    while let Some(node) = cursor.get() {
        seen.push((node.key, cursor.color(), cursor.black_height()));
        cursor.move_next();
    }

    assert_eq!(
        seen,
        [
            (5, Some(Color::Red), 1),
            (10, Some(Color::Black), 1),
            (20, Some(Color::Black), 2),
            (30, Some(Color::Black), 1),
        ]
    );

    // The ghost has no color and the black height of an absent node.
    assert_eq!(cursor.color(), None);
    assert_eq!(cursor.black_height(), 0);
}

#[test]
fn cursor_at_seeks_key() {
    let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    let cursor = tree.cursor_at(&5);
    assert_eq!(cursor.get().map(|n| n.key), Some(5));
    assert_eq!(cursor.peek_prev().map(|n| n.key), Some(4));
    assert_eq!(cursor.peek_next().map(|n| n.key), Some(6));

    // Cursors are `Copy`, so a saved position survives moving the original.
    let mut moved = cursor;
    moved.move_next();
    assert_eq!(moved.get().map(|n| n.key), Some(6));
    assert_eq!(cursor.get().map(|n| n.key), Some(5));

    let mut missing = tree.cursor_at(&8);
    assert!(missing.get().is_none());
    missing.move_next();
    assert_eq!(missing.get().map(|n| n.key), Some(1));
}

#[test]
fn entry_inserts_into_vacant_slot() {
    let mut tree = tree_of(&[10, 20, 30]);

    match tree.entry(&25) {
        Entry::Vacant(vacant) => {
            let node = unsafe { vacant.insert(TestNode::new(25, 75)) };
            assert_eq!(node.key, 25);
        }
        Entry::Occupied(_) => panic!("25 is not in the tree"),
    }
    tree.assert_invariants();
    assert_eq!(tree.len(), 4);

    match tree.entry(&20) {
        Entry::Occupied(occupied) => {
            assert_eq!(occupied.get().value, 60);
            assert_eq!(occupied.color(), Color::Black);
        }
        Entry::Vacant(_) => panic!("20 is in the tree"),
    }
    assert!(tree.entry(&30).is_occupied());
}

#[test]
fn entry_on_empty_tree_sets_root() {
    let mut tree: RbTree<TestNode> = RbTree::new();

    let Entry::Vacant(vacant) = tree.entry(&7) else {
        panic!("tree is empty");
    };
    unsafe { vacant.insert(TestNode::new(7, 21)) };

    tree.assert_invariants();
    let root = tree.root().expect("tree has a root");
    assert_eq!(root.key, 7);
    assert_eq!(tree.color(&root), Color::Black);
}

#[test]
fn get_mut_updates_value() {
    let mut tree = tree_of(&[1, 2, 3]);

    // Only the value changes, so the key order is untouched.
    unsafe {
        let node = tree.get_mut(&2).expect("item not found");
        node.get_unchecked_mut().value = 100;
    }

    assert_eq!(tree.get(&2).map(|n| n.value), Some(100));
    tree.assert_invariants();
}

#[test]
fn occupied_entry_updates_value() {
    let mut tree = tree_of(&[1, 2, 3]);

    let Entry::Occupied(mut occupied) = tree.entry(&3) else {
        panic!("3 is in the tree");
    };
    unsafe { occupied.get_mut().get_unchecked_mut().value += 1 };
    let node = unsafe { occupied.into_mut().get_unchecked_mut() };
    node.value *= 2;

    assert_eq!(tree.get(&3).map(|n| n.value), Some(20));
    tree.assert_invariants();
}

#[test]
fn clear_empties_tree() {
    let mut tree = tree_of(&[5, 1, 9, 3, 7]);

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    tree.assert_invariants();

    // The tree is reusable after clearing.
    tree.insert(TestNode::new(4, 12));
    tree.assert_invariants();
    assert_eq!(keys_of(&tree), [4]);
}

#[test]
fn debug_lists_keys() {
    let tree = tree_of(&[3, 1, 2]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(0u32..200, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }
}
