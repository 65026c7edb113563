//! A BST with lazy deletion. Removing a value only marks its node as a tombstone; the node stays
//! in the tree (and keeps steering searches) until [`Tree::collect_garbage`] physically removes
//! every tombstoned node in one pass.
//!
//! # Examples
//!
//! ```
//! use lazy_bst::lazy::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert(50);
//! tree.insert(20);
//! tree.insert(70);
//!
//! // Soft removal hides the value but keeps its node.
//! assert!(tree.remove(&20));
//! assert!(!tree.contains(&20));
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.hard_len(), 3);
//!
//! // Collecting garbage reclaims the node.
//! tree.collect_garbage();
//! assert_eq!(tree.hard_len(), 2);
//! assert_eq!(tree.iter().collect::<Vec<_>>(), vec![&50, &70]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::Error;

/// A Binary Search Tree with soft (lazy) deletion.
///
/// The tree tracks two sizes: the number of live values ([`len`][Tree::len]) and the number of
/// physical nodes including tombstones ([`hard_len`][Tree::hard_len]). No rebalancing is
/// performed, so inserting sorted input produces a chain.
pub struct Tree<T> {
    root: Link<T>,
    /// Number of nodes that aren't tombstoned.
    live: usize,
    /// Number of nodes physically in the tree, tombstoned or not.
    total: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

// TODO stack based Clone
impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            live: self.live,
            total: self.total,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("live", &self.live)
            .field("total", &self.total)
            .field("root", &self.root)
            .finish()
    }
}

/// Two trees are equal when they hold the same live values. Tombstones and the shape of the
/// tree are ignored.
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.live == other.live && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Tree<T> {}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Self {
            root: Link::Leaf,
            live: 0,
            total: 0,
        }
    }

    /// Number of live (not soft-removed) values in the tree.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Number of physical nodes in the tree, including soft-removed ones still waiting for
    /// [`collect_garbage`][Tree::collect_garbage].
    pub fn hard_len(&self) -> usize {
        self.total
    }

    /// Whether the tree has no live values. A tree holding only tombstones is empty.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Inserts `value`. Returns `false` if a live node already holds an equal value.
    ///
    /// Inserting a value whose node was soft-removed clears the tombstone instead of creating a
    /// new node, so [`hard_len`][Tree::hard_len] is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert!(tree.insert(22));
    /// assert!(!tree.insert(22));
    ///
    /// tree.remove(&22);
    /// assert!(tree.insert(22));
    /// assert_eq!(tree.hard_len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool
    where
        T: Ord,
    {
        match self.root.insert(value) {
            Insertion::Created => {
                self.live += 1;
                self.total += 1;
                true
            }
            Insertion::Resurrected => {
                self.live += 1;
                true
            }
            Insertion::Duplicate => false,
        }
    }

    /// Soft-removes `value`. The node stays in the tree, marked as a tombstone. Returns `false`
    /// if there is no live node holding `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::Tree;
    ///
    /// let mut tree: Tree<_> = [50, 20, 30].into_iter().collect();
    ///
    /// assert!(tree.remove(&20));
    /// assert!(!tree.remove(&20));
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.hard_len(), 3);
    /// ```
    pub fn remove(&mut self, value: &T) -> bool
    where
        T: Ord,
    {
        let removed = self.root.remove(value);
        if removed {
            self.live -= 1;
        }
        removed
    }

    /// Whether a live node holds `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: Ord,
    {
        self.find(value).is_ok()
    }

    /// Finds the stored value equal to `value`. Soft-removed values are not found.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::{lazy::Tree, Error};
    ///
    /// let mut tree: Tree<_> = [1, 2, 3].into_iter().collect();
    /// assert_eq!(tree.find(&2), Ok(&2));
    ///
    /// tree.remove(&2);
    /// assert_eq!(tree.find(&2), Err(Error::NotFound));
    /// ```
    pub fn find(&self, value: &T) -> Result<&T, Error>
    where
        T: Ord,
    {
        let mut link = &self.root;
        while let Link::Node(node) = link {
            link = match value.cmp(&node.value) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal if node.tombstoned => break,
                Ordering::Equal => return Ok(&node.value),
            };
        }
        Err(Error::NotFound)
    }

    /// The smallest live value, skipping over any tombstones.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::{lazy::Tree, Error};
    ///
    /// let mut tree: Tree<_> = [50, 20, 30, 70, 10, 60].into_iter().collect();
    /// tree.remove(&10);
    /// tree.remove(&20);
    /// assert_eq!(tree.find_min(), Ok(&30));
    ///
    /// tree.clear();
    /// assert_eq!(tree.find_min(), Err(Error::NotFound));
    /// ```
    pub fn find_min(&self) -> Result<&T, Error> {
        self.root
            .min_live()
            .map(|node| &node.value)
            .ok_or(Error::NotFound)
    }

    /// The largest live value, skipping over any tombstones.
    pub fn find_max(&self) -> Result<&T, Error> {
        self.root
            .max_live()
            .map(|node| &node.value)
            .ok_or(Error::NotFound)
    }

    /// Calls `visit` with every live value in ascending order.
    pub fn traverse<F>(&self, visit: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(visit);
    }

    /// Iterates over the live values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: self.live,
        };
        iter.push_left_spine(&self.root);
        iter
    }

    /// The height of the physical tree, tombstones included. A single node has height `0` and an
    /// empty tree has no height.
    pub fn height(&self) -> Option<usize> {
        self.root.height()
    }

    /// Physically removes every tombstoned node while keeping the BST ordering. Afterwards
    /// [`hard_len`][Tree::hard_len] equals [`len`][Tree::len].
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::Tree;
    ///
    /// let mut tree: Tree<_> = [50, 20, 30, 70, 10, 60].into_iter().collect();
    /// tree.remove(&50);
    /// tree.remove(&10);
    ///
    /// tree.collect_garbage();
    /// assert_eq!(tree.len(), 4);
    /// assert_eq!(tree.hard_len(), 4);
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![20, 30, 60, 70]);
    /// ```
    pub fn collect_garbage(&mut self) {
        let mut reclaimed = 0;
        self.root = self.root.take().collect_garbage(&mut reclaimed);
        self.total -= reclaimed;

        tracing::debug!(reclaimed, remaining = self.total, "collected garbage");
        debug_assert_eq!(self.total, self.live);
    }

    /// Removes every node, live or tombstoned, and resets both counters.
    pub fn clear(&mut self) {
        // Walk the nodes with an explicit stack so a long chain can't overflow the call stack
        // through recursive `Box` drops.
        let mut stack = Vec::new();
        if let Link::Node(root) = self.root.take() {
            stack.push(root);
        }
        while let Some(mut node) = stack.pop() {
            if let Link::Node(left) = node.left.take() {
                stack.push(left);
            }
            if let Link::Node(right) = node.right.take() {
                stack.push(right);
            }
        }

        if self.total > 0 {
            tracing::trace!(released = self.total, "cleared tree");
        }
        self.live = 0;
        self.total = 0;
    }
}

/// What [`Link::insert`] did with the value it was given.
enum Insertion {
    /// A new node was created.
    Created,
    /// An equal value was tombstoned and is now live again.
    Resurrected,
    /// An equal value is already live so nothing changed.
    Duplicate,
}

/// An owning link to a subtree.
#[derive(Clone, Debug)]
enum Link<T> {
    /// The empty link at the bottom of a subtree.
    Leaf,
    Node(Box<Node<T>>),
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
    tombstoned: bool,
}

impl<T> Link<T> {
    fn new(value: T) -> Self {
        Link::Node(Box::new(Node {
            value,
            left: Link::Leaf,
            right: Link::Leaf,
            tombstoned: false,
        }))
    }

    fn take(&mut self) -> Self {
        mem::replace(self, Link::Leaf)
    }

    fn node(&self) -> Option<&Node<T>> {
        match self {
            Link::Leaf => None,
            Link::Node(node) => Some(node),
        }
    }

    fn node_mut(&mut self) -> Option<&mut Node<T>> {
        match self {
            Link::Leaf => None,
            Link::Node(node) => Some(node),
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self, Link::Leaf)
    }

    fn insert(&mut self, value: T) -> Insertion
    where
        T: Ord,
    {
        match self {
            Link::Leaf => {
                *self = Link::new(value);
                Insertion::Created
            }
            Link::Node(node) => match value.cmp(&node.value) {
                Ordering::Less => node.left.insert(value),
                Ordering::Greater => node.right.insert(value),
                Ordering::Equal if node.tombstoned => {
                    node.tombstoned = false;
                    Insertion::Resurrected
                }
                Ordering::Equal => Insertion::Duplicate,
            },
        }
    }

    fn remove(&mut self, value: &T) -> bool
    where
        T: Ord,
    {
        match self {
            Link::Leaf => false,
            Link::Node(node) => match value.cmp(&node.value) {
                Ordering::Less => node.left.remove(value),
                Ordering::Greater => node.right.remove(value),
                Ordering::Equal if node.tombstoned => false,
                Ordering::Equal => {
                    node.tombstoned = true;
                    true
                }
            },
        }
    }

    /// The live node with the smallest value in this subtree. The leftmost node may be a
    /// tombstone, in which case its right subtree (then its parent) is searched next.
    fn min_live(&self) -> Option<&Node<T>> {
        let node = self.node()?;
        node.left.min_live().or_else(|| {
            if node.tombstoned {
                node.right.min_live()
            } else {
                Some(node)
            }
        })
    }

    /// Mirror image of [`Link::min_live`].
    fn max_live(&self) -> Option<&Node<T>> {
        let node = self.node()?;
        node.right.max_live().or_else(|| {
            if node.tombstoned {
                node.left.max_live()
            } else {
                Some(node)
            }
        })
    }

    fn min_live_mut(&mut self) -> Option<&mut Node<T>> {
        let node = self.node_mut()?;
        if node.left.min_live().is_some() {
            return node.left.min_live_mut();
        }
        if !node.tombstoned {
            return Some(node);
        }
        node.right.min_live_mut()
    }

    fn height(&self) -> Option<usize> {
        let node = self.node()?;
        let below = node.left.height().max(node.right.height());
        Some(below.map_or(0, |h| h + 1))
    }

    /// Postorder pass hard-deleting every tombstoned node in this subtree. Returns the link that
    /// replaces this one and adds the number of released nodes to `reclaimed`.
    fn collect_garbage(self, reclaimed: &mut usize) -> Self {
        let mut node = match self {
            Link::Leaf => return Link::Leaf,
            Link::Node(node) => node,
        };

        node.left = node.left.take().collect_garbage(reclaimed);
        node.right = node.right.take().collect_garbage(reclaimed);

        if !node.tombstoned {
            return Link::Node(node);
        }

        if !node.left.is_leaf() && !node.right.is_leaf() {
            // Pull the successor's value up into this node and tombstone the successor instead.
            // The right subtree is already compacted, so its minimum is live and has no left
            // child; the second pass over it unlinks that node.
            let Some(successor) = node.right.min_live_mut() else {
                unreachable!("compacted right subtree has no live minimum");
            };
            mem::swap(&mut node.value, &mut successor.value);
            successor.tombstoned = true;
            node.tombstoned = false;
            node.right = node.right.take().collect_garbage(reclaimed);
            return Link::Node(node);
        }

        *reclaimed += 1;
        let Node { left, right, .. } = *node;
        if left.is_leaf() {
            right
        } else {
            left
        }
    }
}

/// An in-order iterator over the live values of a [`Tree`]. Created by [`Tree::iter`].
pub struct Iter<'a, T> {
    /// Nodes whose left subtree has been pushed but which haven't been yielded yet.
    stack: Vec<&'a Node<T>>,
    /// Live values not yet yielded.
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut link: &'a Link<T>) {
        while let Link::Node(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.push_left_spine(&node.right);
            if !node.tombstoned {
                self.remaining -= 1;
                return Some(&node.value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
