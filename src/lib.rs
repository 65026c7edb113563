//! This crate exposes a Binary Search Tree (BST) with lazy deletion.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! ## Lazy deletion
//!
//! Deleting from a BST normally restructures the tree right away: a node with two
//! children has to be replaced by its in-order successor, which then has to be
//! unlinked from further down. A lazy BST skips all of that. Removing a value just
//! marks its node as a "tombstone". The node stays where it is, still steering
//! searches left and right, but is invisible to every query. Re-inserting the
//! value simply clears the mark.
//!
//! The tombstones are reclaimed later, all at once, by a garbage collection pass
//! that does the usual restructuring for every marked node. Until then, the tree
//! keeps two sizes: how many values are live and how many nodes it physically holds.
//!
//! > Note that the BST invariants above hold for _all_ nodes, tombstones included.
//!
//! No rebalancing is performed, so the height of the tree depends on insertion order.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
pub mod lazy;


pub use error::Error;
