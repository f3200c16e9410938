use crate::{Color, Dir, Link, Links, RbTree, TreeNode};

/// A read-only cursor over a [`RbTree`].
///
/// A cursor points either to an element of the tree or to a "ghost" non-element that sits between
/// the last element and the first. Besides walking the tree in key order, a cursor reports the
/// color and black height of the element under it.
///
/// Nodes are mutated through [`RbTree::get_mut`] rather than through a cursor.
pub struct Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree RbTree<T>,
    current: Link<T>,
}

impl<'tree, T> Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn new(tree: &'tree RbTree<T>, current: Link<T>) -> Self {
        Cursor { tree, current }
    }

    // Stepping off either end lands on the ghost, and stepping off the ghost wraps to the opposite
    // end.
    fn neighbor(&self, dir: Dir) -> Link<T> {
        match self.current {
            Some(node) => unsafe { self.tree.neighbor_raw(node, dir) },
            None => self.tree.end_raw(!dir),
        }
    }

    /// Moves the cursor to the next element in key order.
    ///
    /// From the last element the cursor moves to the ghost, and from the ghost to the first
    /// element.
    pub fn move_next(&mut self) {
        self.current = self.neighbor(Dir::Right);
    }

    /// Moves the cursor to the previous element in key order.
    ///
    /// From the first element the cursor moves to the ghost, and from the ghost to the last
    /// element.
    pub fn move_prev(&mut self) {
        self.current = self.neighbor(Dir::Left);
    }

    /// Returns the element under the cursor, or `None` at the ghost.
    pub fn get(&self) -> Option<&'tree T> {
        self.current.map(|node| unsafe { node.as_ref() })
    }

    /// Returns the element [`move_next`](Self::move_next) would move to.
    pub fn peek_next(&self) -> Option<&'tree T> {
        self.neighbor(Dir::Right).map(|node| unsafe { node.as_ref() })
    }

    /// Returns the element [`move_prev`](Self::move_prev) would move to.
    pub fn peek_prev(&self) -> Option<&'tree T> {
        self.neighbor(Dir::Left).map(|node| unsafe { node.as_ref() })
    }

    /// Returns the color of the element under the cursor, or `None` at the ghost.
    pub fn color(&self) -> Option<Color> {
        self.get().map(|node| self.tree.color(node))
    }

    /// Returns the black height of the element under the cursor.
    ///
    /// The ghost is treated as an absent node and reports 0. See [`RbTree::black_height`].
    pub fn black_height(&self) -> usize {
        self.tree.black_height(self.get())
    }
}

impl<T> Clone for Cursor<'_, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> where T: TreeNode<Links<T>> + ?Sized {}
