use std::ptr::NonNull;

use cordyceps::Linked;
use cordyceps_rbtree::{Links, RbTree, TreeNode};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Debug)]
#[repr(C)]
struct TestNode {
    links: Links<TestNode>,
    key: u32,
    value: &'static str,
}

impl TestNode {
    fn new(key: u32, value: &'static str) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
            value,
        })
    }
}

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

fn print_tree(tree: &RbTree<TestNode>) {
    let keys: Vec<u32> = tree.iter().map(|node| node.key).collect();

    match tree.root() {
        Some(root) => println!(
            "{keys:?} root={} ({:?}) height={} black height={}",
            root.key,
            tree.color(&root),
            tree.height(),
            tree.black_height(Some(&*root)),
        ),
        None => println!("{keys:?}"),
    }
}

fn main() {
    let _ = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let mut tree: RbTree<TestNode> = RbTree::new();

    for (key, value) in [
        (10, "ten"),
        (20, "twenty"),
        (30, "thirty"),
        (15, "fifteen"),
        (25, "twenty-five"),
        (5, "five"),
        (1, "one"),
    ] {
        tree.insert(TestNode::new(key, value));
        tree.assert_invariants();
        print_tree(&tree);
    }

    if let Some(rejected) = tree.insert(TestNode::new(15, "again")) {
        println!("rejected duplicate {} => {:?}", rejected.key, rejected.value);
    }
    tree.assert_invariants();

    let found = tree.search(&TestNode::new(25, "twenty-five"));
    println!("search 25 => {:?}", found.map(|node| node.value));

    let missing = tree.search(&TestNode::new(25, "other"));
    println!("search 25 with another value => {:?}", missing.map(|node| node.value));

    drop(tree);
}
