//! An intrusive red-black tree.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// Conventions used in comments follow Cormen, Leiserson, Rivest and Stein:
// - `z` is the node being repaired, `p` is its parent and `g` its grandparent.
// - The uncle `u` of `z` is the sibling of `p`.
// - Missing children are nil leaves. Nil leaves are black.
// - The black height `bh(x)` of a node `x` is the number of black nodes, nil leaves included, on a
//   path from `x` down to a nil leaf, not counting `x` itself.
//
// The fundamental invariants of a red-black tree are:
// 1. Every node is either red or black.
// 2. The root is black.
// 3. A red node has no red child.
// 4. For every node `x`, all paths from `x` down to a nil leaf contain `bh(x)` black nodes.
//
// Corollaries:
// 5. The subtree rooted at `x` contains at least `2^bh(x) - 1` nodes.
//
//    Proof: by induction on the height of `x`. Each child of `x` has black height at least
//    `bh(x) - 1` (by (4)), so the subtree holds at least `2(2^(bh(x) - 1) - 1) + 1` nodes.
//
// 6. A tree of `n` nodes has height at most `2 log2(n + 1)`.
//
//    Proof:
//    a. At least half of the nodes below the root on any root-to-nil path are black (by (3)).
//    b. `bh(root) >= h / 2` (by (a)).
//    QED by (b) and (5), since `n >= 2^(h / 2) - 1`.

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

use core::{
    borrow::Borrow, cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not,
    pin::Pin, ptr::NonNull,
};

use cordyceps::Linked;

mod cursor;
mod entry;
mod iter;
#[cfg(any(test, feature = "alloc"))]
mod map;
#[cfg(any(test, feature = "model"))]
pub mod model;
#[cfg(test)]
mod tests;

pub use cursor::Cursor;
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use iter::Iter;
#[cfg(any(test, feature = "alloc"))]
pub use map::RbMap;

use entry::InsertAs;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord + fmt::Debug;

    fn key(&self) -> &Self::Key;
}

/// An intrusive red-black tree.
///
/// Nodes are linked in through their [`Links`] and owned by the tree until it is cleared or
/// dropped. The tree supports insertion and lookup; individual nodes are never removed.
pub struct RbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

/// The color of a node in an [`RbTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    pub const fn is_red(self) -> bool {
        matches!(self, Color::Red)
    }

    #[inline]
    pub const fn is_black(self) -> bool {
        matches!(self, Color::Black)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    color: Color,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> RbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> RbTree<T> {
        RbTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the root element of the tree.
    pub fn root(&self) -> Option<Pin<&T>> {
        self.root
            .map(|root| unsafe { Pin::new_unchecked(root.as_ref()) })
    }

    /// Returns the color of `node`.
    ///
    /// An element that was never linked into a tree reports [`Color::Red`].
    pub fn color(&self, node: &T) -> Color {
        unsafe { T::links(NonNull::from(node)).as_ref().color() }
    }

    /// Returns the black height of `node`.
    ///
    /// This is the number of black nodes on a path from `node` down to a nil leaf, not counting
    /// `node` itself. Nil leaves are black, so the black height of a leaf is 1 and that of an
    /// absent node (`None`) is 0.
    ///
    /// Conventions that count `node` itself when it is black and give nil leaves 0 report one less
    /// for a red node and the same value for a black one.
    pub fn black_height(&self, node: Option<&T>) -> usize {
        let Some(node) = node else {
            return 0;
        };

        // All paths agree, so follow the leftmost one. Start at 1 for the nil leaf at its end.
        let mut height = 1;
        let mut opt_cur = unsafe { T::links(NonNull::from(node)).as_ref().left() };

        while let Some(cur) = opt_cur {
            unsafe {
                if T::links(cur).as_ref().color().is_black() {
                    height += 1;
                }

                opt_cur = T::links(cur).as_ref().left();
            }
        }

        height
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    pub fn height(&self) -> usize {
        unsafe { Self::subtree_height(self.root) }
    }

    unsafe fn subtree_height(node: Link<T>) -> usize {
        let Some(node) = node else {
            return 0;
        };

        unsafe {
            let left = Self::subtree_height(T::links(node).as_ref().left());
            let right = Self::subtree_height(T::links(node).as_ref().right());

            1 + left.max(right)
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree has nonzero length");
            return;
        };

        unsafe {
            assert!(
                T::links(root).as_ref().parent().is_none(),
                "root parent pointer is set"
            );
            assert_eq!(T::links(root).as_ref().color(), Color::Black, "root is red");

            let mut count = 0;
            self.assert_invariants_at(root, &mut count);
            assert_eq!(count, self.len, "length does not match linked node count");
        }

        // Ensure the in-order sequence is strictly ascending.
        let mut keys = self.iter().map(|node| node.key());
        if let Some(mut prev) = keys.next() {
            for key in keys {
                assert!(prev < key, "keys out of order: {prev:?} before {key:?}");
                prev = key;
            }
        }

        // Ensure the height bound holds.
        let height = self.height();
        assert!(
            height / 2 < usize::BITS as usize && 1_usize << (height / 2) <= self.len + 1,
            "height {height} too large for {} nodes",
            self.len
        );
    }

    // Checks the subtree rooted at `node` and counts its nodes into `count`.
    //
    // Returns the number of black nodes on any path from `node` down to a nil leaf, including both
    // `node` and the nil leaf.
    unsafe fn assert_invariants_at(&self, node: NonNull<T>, count: &mut usize) -> usize {
        unsafe {
            *count += 1;

            let color = T::links(node).as_ref().color();
            let mut heights = [1; 2];

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = T::links(node).as_ref().child(dir) {
                    // Ensure child's parent link points to this node.
                    let parent = T::links(child)
                        .as_ref()
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(node, parent);

                    // Ensure red nodes only have black children.
                    if color.is_red() {
                        assert!(
                            T::links(child).as_ref().color().is_black(),
                            "red node {:?} has red child {:?}",
                            node.as_ref().key(),
                            child.as_ref().key(),
                        );
                    }

                    // Ensure the child is on the correct side.
                    let expected = match dir {
                        Dir::Left => Ordering::Less,
                        Dir::Right => Ordering::Greater,
                    };
                    assert_eq!(child.as_ref().key().cmp(node.as_ref().key()), expected);

                    heights[dir as usize] = self.assert_invariants_at(child, count);
                }
            }

            // Ensure both subtrees have the same black height.
            assert_eq!(
                heights[0],
                heights[1],
                "black height differs below {:?}",
                node.as_ref().key()
            );
            assert_eq!(self.black_height(Some(node.as_ref())), heights[0]);

            heights[0] + usize::from(color.is_black())
        }
    }

    /// Returns `true` if the tree contains an element with the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a reference to the node corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    ///
    /// # Safety
    ///
    /// The caller must ensure that modifications to the returned node do not violate the invariants
    /// of the tree. In particular, the node's links must not be modified, and the result of
    /// comparisons between its key and the keys of other nodes in the tree must not change.
    pub unsafe fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns the node that compares equal to `probe`.
    ///
    /// The tree is searched by `probe.key()`, and the node found there is returned only if it is
    /// also equal to `probe`. `probe` itself does not need to be linked into a tree.
    pub fn search(&self, probe: &T) -> Option<Pin<&T>>
    where
        T: PartialEq,
    {
        let node = self.get(probe.key())?;
        (*node == *probe).then_some(node)
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.find_slot(key).ok()
    }

    // Descends the tree looking for `key`.
    //
    // Returns the node holding `key`, or the empty slot a node holding `key` would be linked into.
    fn find_slot<Q>(&self, key: &Q) -> Result<NonNull<T>, InsertAs<T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Err(InsertAs::Root);
        };

        loop {
            let dir = match key.cmp(unsafe { cur.as_ref().key().borrow() }) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Ok(cur),
                Ordering::Greater => Dir::Right,
            };

            match unsafe { T::links(cur).as_ref().child(dir) } {
                Some(child) => cur = child,
                None => return Err(InsertAs::Child { parent: cur, dir }),
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.first_raw()
            .map(|first| unsafe { Pin::new_unchecked(first.as_ref()) })
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.last_raw()
            .map(|last| unsafe { Pin::new_unchecked(last.as_ref()) })
    }

    pub(crate) fn first_raw(&self) -> Link<T> {
        self.end_raw(Dir::Left)
    }

    pub(crate) fn last_raw(&self) -> Link<T> {
        self.end_raw(Dir::Right)
    }

    // Returns the minimum (`Dir::Left`) or maximum (`Dir::Right`) node of the tree.
    pub(crate) fn end_raw(&self, dir: Dir) -> Link<T> {
        self.root
            .map(|root| unsafe { self.extreme_in_subtree(root, dir) })
    }

    /// Returns an in-order iterator over the elements of the tree.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing to the minimum element of the tree.
    ///
    /// If the tree is empty, the cursor points to the "ghost" non-element.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.first_raw())
    }

    /// Returns a cursor pointing to the maximum element of the tree.
    ///
    /// If the tree is empty, the cursor points to the "ghost" non-element.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.last_raw())
    }

    /// Returns a cursor pointing to the element with the given key.
    ///
    /// If there is no such element, the cursor points to the "ghost" non-element.
    pub fn cursor_at<Q>(&self, key: &Q) -> Cursor<'_, T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        Cursor::new(self, self.get_raw(key))
    }

    /// Returns the entry corresponding to `key`.
    pub fn entry<Q>(&mut self, key: &Q) -> Entry<'_, T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        match self.find_slot(key) {
            Ok(node) => unsafe { Entry::occupied(self, node) },
            Err(insert_as) => unsafe { Entry::vacant(self, insert_as) },
        }
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { T::links(node).as_mut().set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that the following conditions hold:
    // - `old_child` is a child node of `parent`.
    // - `new_child` is not a child node of `parent`.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Option<NonNull<T>>,
    ) {
        unsafe {
            let dir = self.which_child(parent, old_child);

            debug_assert_eq!(
                T::links(parent).as_ref().child(dir),
                Some(old_child),
                "`old_child` must be a child of `parent`"
            );
            debug_assert!(
                new_child.is_none() || T::links(parent).as_ref().child(!dir) != new_child,
                "`new_child` must not be a child of `parent`"
            );

            T::links(parent).as_mut().set_child(dir, new_child);
        }
    }

    /// Rotates the subtree rooted at `node` to the left.
    ///
    /// The right child of `node` takes its place, `node` becomes that child's left child, and the
    /// child's former left subtree becomes `node`'s right subtree. If `node` has no right child,
    /// this does nothing.
    ///
    /// The in-order sequence of the tree is preserved. Colors are not changed, so the tree may no
    /// longer satisfy the red-black invariants afterward.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn rotate_left(&mut self, node: NonNull<T>) {
        unsafe { self.rotate(node, Dir::Left) }
    }

    /// Rotates the subtree rooted at `node` to the right.
    ///
    /// This is the mirror image of [`RbTree::rotate_left`], pivoting on the left child of `node`.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn rotate_right(&mut self, node: NonNull<T>) {
        unsafe { self.rotate(node, Dir::Right) }
    }

    // Performs a rotation, moving `down` down in direction `dir` and its `!dir` child up.
    //
    // Does nothing if `down` has no `!dir` child. Colors are not updated.
    unsafe fn rotate(&mut self, down: NonNull<T>, dir: Dir) {
        unsafe {
            let Some(up) = T::links(down).as_ref().child(!dir) else {
                return;
            };

            // - `down` becomes the `dir` child of `up`.
            // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
            let across = T::links(up).as_mut().set_child(dir, Some(down));
            T::links(down).as_mut().set_child(!dir, across);
            self.maybe_set_parent(across, Some(down));

            let parent = T::links(down).as_mut().set_parent(Some(up));
            T::links(up).as_mut().set_parent(parent);
            self.replace_child_or_set_root(parent, down, Some(up));
        }
    }

    /// Inserts an item into the tree.
    ///
    /// If the tree already contains an item with an equal key, the tree is left unchanged and
    /// `item` is handed back.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        match self.find_slot(unsafe { ptr.as_ref().key() }) {
            Ok(existing) => {
                log::debug!("rejected duplicate key {:?}", unsafe {
                    existing.as_ref().key()
                });

                Some(unsafe { T::from_ptr(ptr) })
            }

            Err(insert_as) => {
                unsafe { self.link_at(insert_as, ptr) };
                None
            }
        }
    }

    // Links `node` into the empty slot `insert_as` as a red leaf, then rebalances.
    //
    // # Safety
    //
    // `insert_as` must have been returned by `find_slot` for the key of `node`, and the tree must
    // not have been modified since.
    pub(crate) unsafe fn link_at(&mut self, insert_as: InsertAs<T>, node: NonNull<T>) {
        unsafe {
            let links = T::links(node).as_mut();
            links.set_left(None);
            links.set_right(None);

            match insert_as {
                InsertAs::Root => {
                    debug_assert!(self.root.is_none());

                    // Tree is empty. Set `node` as the root and return.
                    links.set_parent(None);
                    links.set_color(Color::Black);
                    self.root = Some(node);
                }

                InsertAs::Child { parent, dir } => {
                    debug_assert!(T::links(parent).as_ref().child(dir).is_none());

                    links.set_parent(Some(parent));
                    links.set_color(Color::Red);
                    T::links(parent).as_mut().set_child(dir, Some(node));

                    self.rebalance_inserted(node);
                }
            }
        }

        self.len += 1;
    }

    // Performs a bottom-up rebalance of the tree after the insertion of `node`.
    //
    // Invariants:
    // - `node` is red and has no children.
    // - `node` is not the tree root.
    // - If any invariant is violated, it is (3), and only between `node` and its parent.
    unsafe fn rebalance_inserted(&mut self, node: NonNull<T>) {
        let mut z = node;

        unsafe {
            debug_assert!(self.is_red(Some(z)));

            // While `z` has a red parent, `z` and `p` are the only red-red pair in the tree.
            while let Some(p) = T::links(z).as_ref().parent().filter(|&p| self.is_red(Some(p))) {
                // `p` is red, so it is not the root (by (2)) and `g` is black (by (3)).
                let g = T::links(p)
                    .as_ref()
                    .parent()
                    .expect("red node must not be the tree root");
                debug_assert!(!self.is_red(Some(g)));

                // Cases are mirrored according to which child of `g` is `p`.
                let side = self.which_child(g, p);
                let u = T::links(g).as_ref().child(!side);

                match u.filter(|&u| self.is_red(Some(u))) {
                    Some(u) => {
                        // `u` is red. Moving the redness of `p` and `u` up to `g` fixes `z`
                        // without changing any black height, but `g` may now have a red parent.
                        log::trace!("red uncle: recoloring at {:?}", g.as_ref().key());

                        self.set_color(p, Color::Black);
                        self.set_color(u, Color::Black);
                        self.set_color(g, Color::Red);

                        z = g;
                    }

                    None => {
                        // `u` is black. If `z` is an inner child, rotate it into the place of `p`
                        // so that `p` becomes the outer child of `z`.
                        let p = if self.which_child(p, z) == side {
                            p
                        } else {
                            log::trace!("inner child: rotating {side:?} at {:?}", p.as_ref().key());

                            self.rotate(p, side);
                            z
                        };

                        // The red-red pair is now on the outside. Rotating `g` down under `p` and
                        // exchanging their colors restores (3) and leaves every black height as
                        // it was, so the repair is complete.
                        log::trace!(
                            "outer child: rotating {:?} at {:?}",
                            !side,
                            g.as_ref().key()
                        );

                        self.set_color(p, Color::Black);
                        self.set_color(g, Color::Red);
                        self.rotate(g, !side);

                        break;
                    }
                }
            }

            if let Some(root) = self.root {
                self.set_color(root, Color::Black);
            }
        }
    }

    // Returns the minimum (`Dir::Left`) or maximum (`Dir::Right`) node in the subtree.
    #[inline]
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(child) = unsafe { T::links(cur).as_ref().child(dir) } {
            cur = child;
        }

        cur
    }

    // Returns the in-order neighbor of `node` in direction `dir`.
    pub(crate) unsafe fn neighbor_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = T::links(node).as_ref().child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            // Ascend until arriving from the `!dir` side.
            let mut cur = node;
            while let Some(parent) = T::links(cur).as_ref().parent() {
                if self.which_child(parent, cur) == !dir {
                    return Some(parent);
                }

                cur = parent;
            }

            None
        }
    }

    pub(crate) unsafe fn successor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Right) }
    }

    pub(crate) unsafe fn predecessor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Left) }
    }

    /// Clears the tree, dropping all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.extreme_in_subtree(cur, Dir::Left);
                let parent = T::links(cur).as_ref().parent();
                let right = T::links(cur).as_ref().right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                // Drop the node.
                drop(T::from_ptr(cur));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    // Support methods ========================================================

    #[inline]
    unsafe fn set_color(&mut self, node: NonNull<T>, color: Color) {
        unsafe { T::links(node).as_mut().set_color(color) };
    }

    /// Returns `true` if the pointed-to node is red. Nil leaves are black.
    #[inline]
    unsafe fn is_red(&self, node: Link<T>) -> bool {
        node.map(|n| unsafe { T::links(n).as_ref().color().is_red() })
            .unwrap_or(false)
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { T::links(parent).as_ref().left() } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }
}

impl<T> Default for RbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for RbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|node| node.key()))
            .finish()
    }
}

impl<'tree, T> IntoIterator for &'tree RbTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: ?Sized> Links<T> {
    /// Returns a new set of unlinked links.
    ///
    /// Nodes start out red, as every node except the root is red when first linked.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                color: Color::Red,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn color(&self) -> Color {
        unsafe { (*self.inner.get()).color }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_color(&mut self, color: Color) {
        self.inner.get_mut().color = color;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("color", &self.color())
            .finish()
    }
}
