//! Type-erased handles to node instances.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable, type-erased handle to one node in an object graph.
///
/// A `NodeRef` wraps an `Rc<RefCell<T>>` and remembers which `T` it holds,
/// so typed handles round-trip losslessly through [`NodeRef::from_rc`] and
/// [`NodeRef::downcast`]. Node identity is object identity: two handles
/// refer to the same node exactly when [`NodeRef::ptr_eq`] holds, no matter
/// what the fields contain.
///
/// Handles are single-threaded (`Rc`); the schema registry is the shareable
/// half of the system. Graphs that contain reference cycles keep their
/// nodes alive until every handle into the cycle is dropped — callers that
/// build long-lived cyclic graphs own that trade-off.
#[derive(Clone)]
pub struct NodeRef {
    cell: Rc<dyn Any>, // always a RefCell<T>
    type_id: TypeId,
    type_name: &'static str,
}

impl NodeRef {
    /// Wraps a fresh node instance.
    #[must_use]
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_rc(Rc::new(RefCell::new(value)))
    }

    /// Wraps an already-shared instance without copying it.
    #[must_use]
    pub fn from_rc<T: 'static>(cell: Rc<RefCell<T>>) -> Self {
        Self {
            cell,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Recovers the typed handle, or `None` if this node is not a `T`.
    #[must_use]
    pub fn downcast<T: 'static>(&self) -> Option<Rc<RefCell<T>>> {
        Rc::clone(&self.cell).downcast::<RefCell<T>>().ok()
    }

    /// `TypeId` of the wrapped node type.
    #[must_use]
    pub fn node_type(&self) -> TypeId {
        self.type_id
    }

    /// Full name of the wrapped node type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// True when both handles refer to the same node instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    /// Allocation address of the node.
    ///
    /// The identity key for clone-cache bookkeeping. Only meaningful while
    /// some handle pins the allocation; the cloner's arena holds on to every
    /// original it has seen for exactly this reason.
    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.cell) as *const () as usize
    }

    /// Runs `f` against a shared borrow of the node, if it is a `T`.
    pub fn with<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let cell = self.downcast::<T>()?;
        let guard = cell.borrow();
        Some(f(&guard))
    }

    /// Runs `f` against an exclusive borrow of the node, if it is a `T`.
    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let cell = self.downcast::<T>()?;
        let mut guard = cell.borrow_mut();
        Some(f(&mut guard))
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("type", &self.type_name)
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}
