extern crate std;

use std::{collections::BTreeMap, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{Links, RbTree, TreeNode};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
    pub value: u32,
}

impl TestNode {
    pub fn new(key: u32, value: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
            value,
        })
    }
}

// Nodes are equal if both their keys and their values are equal.
impl PartialEq for TestNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// A key operand, either an index into the keys inserted so far or an arbitrary key.
///
/// Indices make lookups hit existing keys far more often than random keys would.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

impl ItemValue {
    fn resolve(self, sorted: &[u32]) -> u32 {
        match self {
            ItemValue::Index(idx) if sorted.is_empty() => idx as u32,
            ItemValue::Index(idx) => sorted[idx % sorted.len()],
            ItemValue::Random(key) => key,
        }
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![
        (0usize..1000).prop_map(ItemValue::Index),
        (0u32..1000).prop_map(ItemValue::Random),
    ]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue, u32),
    Get(ItemValue),
    Search(ItemValue, u32),
    First,
    Last,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        match self {
            Op::Insert(item, value) => FinalOp::Insert(item.resolve(sorted), value),
            Op::Get(item) => FinalOp::Get(item.resolve(sorted)),
            Op::Search(item, value) => FinalOp::Search(item.resolve(sorted), value),
            Op::First => FinalOp::First,
            Op::Last => FinalOp::Last,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32, u32),
    Get(u32),
    Search(u32, u32),
    First,
    Last,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        (value_strategy(), 0u32..4).prop_map(|(key, value)| Op::Insert(key, value)),
        value_strategy().prop_map(Op::Get),
        (value_strategy(), 0u32..4).prop_map(|(key, value)| Op::Search(key, value)),
        Just(Op::First),
        Just(Op::Last),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_keys = Vec::with_capacity(ops.len());
    let mut btree = BTreeMap::new();
    let mut rb: RbTree<TestNode> = RbTree::new();

    fn insert_sorted(v: &mut Vec<u32>, key: u32) {
        if let Err(idx) = v.binary_search(&key) {
            v.insert(idx, key);
        }
    }

    #[inline]
    fn entry(node: &TestNode) -> (u32, u32) {
        (node.key, node.value)
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_keys);

        match final_op {
            FinalOp::Insert(key, value) => {
                insert_sorted(&mut sorted_keys, key);

                // An existing entry is never overwritten.
                let from_btree = if btree.contains_key(&key) {
                    Some((key, value))
                } else {
                    btree.insert(key, value);
                    None
                };
                let from_rb = rb.insert(TestNode::new(key, value)).map(|node| entry(&node));

                assert_eq!(from_btree, from_rb, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get_key_value(&key).map(|(&k, &v)| (k, v));
                let from_rb = rb.get(&key).map(|node| entry(&node));

                assert_eq!(from_btree, from_rb, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Search(key, value) => {
                let from_btree = btree
                    .get(&key)
                    .filter(|&&v| v == value)
                    .map(|&v| (key, v));
                let probe = TestNode::new(key, value);
                let from_rb = rb.search(&probe).map(|node| entry(&node));

                assert_eq!(from_btree, from_rb, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(|(&k, &v)| (k, v));
                let from_rb = rb.first().map(|node| entry(&node));

                assert_eq!(from_btree, from_rb, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(|(&k, &v)| (k, v));
                let from_rb = rb.last().map(|node| entry(&node));

                assert_eq!(from_btree, from_rb, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        rb.assert_invariants();
        assert_eq!(btree.len(), rb.len());
        assert!(btree
            .iter()
            .map(|(&k, &v)| (k, v))
            .eq(rb.iter().map(entry)));
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum CursorOp {
    MoveNext,
    MovePrev,
    PeekNext,
    PeekPrev,
    Seek(ItemValue),
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MoveNext),
        Just(CursorOp::MovePrev),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        value_strategy().prop_map(CursorOp::Seek),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub values: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_values: usize = u.int_in_range(0..=99)?;
        let num_ops: usize = u.int_in_range(0..=999)?;

        let values = (0..num_values)
            .map(|_| u.arbitrary())
            .collect::<arbitrary::Result<_>>()?;
        let ops = (0..num_ops)
            .map(|_| u.arbitrary())
            .collect::<arbitrary::Result<_>>()?;

        Ok(CursorEquivalenceInput { values, ops })
    }
}

// A cursor over a sorted, deduplicated key list. `None` is the ghost position.
struct SortedCursor {
    keys: Vec<u32>,
    pos: Option<usize>,
}

impl SortedCursor {
    fn next(&self) -> Option<usize> {
        match self.pos {
            Some(i) => Some(i + 1).filter(|&i| i < self.keys.len()),
            None => (!self.keys.is_empty()).then_some(0),
        }
    }

    fn prev(&self) -> Option<usize> {
        match self.pos {
            Some(i) => i.checked_sub(1),
            None => self.keys.len().checked_sub(1),
        }
    }

    fn key_at(&self, pos: Option<usize>) -> Option<u32> {
        pos.map(|i| self.keys[i])
    }
}

pub fn run_cursor_equivalence(values: Vec<u32>, ops: Vec<CursorOp>) {
    let mut rb: RbTree<TestNode> = RbTree::new();
    let mut model = SortedCursor {
        keys: Vec::with_capacity(values.len()),
        pos: None,
    };

    // Insert in the given order so that every rebalancing case is exercised.
    for key in values {
        rb.insert(TestNode::new(key, key));

        if let Err(idx) = model.keys.binary_search(&key) {
            model.keys.insert(idx, key);
        }
    }
    rb.assert_invariants();

    let mut cursor = rb.cursor_first();
    model.pos = model.next();

    for (op_id, op) in ops.into_iter().enumerate() {
        match op {
            CursorOp::MoveNext => {
                cursor.move_next();
                model.pos = model.next();
            }

            CursorOp::MovePrev => {
                cursor.move_prev();
                model.pos = model.prev();
            }

            CursorOp::PeekNext => assert_eq!(
                cursor.peek_next().map(|node| node.key),
                model.key_at(model.next()),
                "CursorOp #{op_id}: {op:?}"
            ),

            CursorOp::PeekPrev => assert_eq!(
                cursor.peek_prev().map(|node| node.key),
                model.key_at(model.prev()),
                "CursorOp #{op_id}: {op:?}"
            ),

            CursorOp::Seek(item) => {
                let key = item.resolve(&model.keys);
                cursor = rb.cursor_at(&key);
                model.pos = model.keys.binary_search(&key).ok();
            }
        }

        assert_eq!(
            cursor.get().map(|node| node.key),
            model.key_at(model.pos),
            "CursorOp #{op_id}: {op:?}"
        );

        // The ghost has no color and counts as an absent node.
        match cursor.get() {
            Some(node) => {
                assert_eq!(cursor.color(), Some(rb.color(node)));
                assert_eq!(cursor.black_height(), rb.black_height(Some(node)));
                assert!(cursor.black_height() >= 1);
            }
            None => {
                assert_eq!(cursor.color(), None);
                assert_eq!(cursor.black_height(), 0);
            }
        }
    }
}
