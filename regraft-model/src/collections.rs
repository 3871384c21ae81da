//! Collection kinds and the identity-keyed node set.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The closed set of relationship-collection shapes.
///
/// Fixed per field when its descriptor is built. The typed setter of a
/// collection field rebuilds its own concrete container, so a cloned
/// ordered sequence stays an ordered sequence and a cloned unique set stays
/// a unique set — there is no runtime container probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// `Vec`-like: order-preserving, duplicates allowed.
    OrderedSequence,
    /// [`NodeSet`]-like: at most one element per node identity.
    UniqueSet,
    /// Any other container with its own `FromIterator` construction.
    Other,
}

/// A unique-set container for shared node handles.
///
/// Membership is by node identity (same allocation), not value equality:
/// two distinct nodes with equal fields are two elements. Iteration follows
/// insertion order so traversal stays deterministic.
pub struct NodeSet<T> {
    items: Vec<Rc<RefCell<T>>>,
}

impl<T> NodeSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts a node. Returns false when this instance is already present.
    pub fn insert(&mut self, node: Rc<RefCell<T>>) -> bool {
        if self.contains(&node) {
            return false;
        }
        self.items.push(node);
        true
    }

    /// True when this exact instance is in the set.
    #[must_use]
    pub fn contains(&self, node: &Rc<RefCell<T>>) -> bool {
        self.items.iter().any(|item| Rc::ptr_eq(item, node))
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the set has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<RefCell<T>>> {
        self.items.iter()
    }
}

impl<T> Default for NodeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls: the derived versions would demand `T: Clone`/`T: Debug`,
// but only the Rc handles are ever cloned or printed.
impl<T> Clone for NodeSet<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> fmt::Debug for NodeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSet").field("len", &self.len()).finish()
    }
}

impl<T> FromIterator<Rc<RefCell<T>>> for NodeSet<T> {
    fn from_iter<I: IntoIterator<Item = Rc<RefCell<T>>>>(iter: I) -> Self {
        let mut set = Self::new();
        for node in iter {
            set.insert(node);
        }
        set
    }
}

impl<T> IntoIterator for NodeSet<T> {
    type Item = Rc<RefCell<T>>;
    type IntoIter = std::vec::IntoIter<Rc<RefCell<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NodeSet<T> {
    type Item = &'a Rc<RefCell<T>>;
    type IntoIter = std::slice::Iter<'a, Rc<RefCell<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
