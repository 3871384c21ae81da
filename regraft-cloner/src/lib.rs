//! Recursive deep copy of node graphs described by a
//! [`regraft_model::SchemaRegistry`].
//!
//! [`GraphCloner`] produces an insert-ready copy of an object graph:
//! detached from the original's identity (identifier fields reset to their
//! defaults), shape-preserving (nodes reachable along several paths stay a
//! single copy, cycles stay cycles), with bidirectional relationship links
//! re-pointed at the copies rather than the originals.
//!
//! One clone call is one synchronous traversal over one private identity
//! cache. Original nodes are never mutated; every write lands on a freshly
//! constructed copy.

mod arena;
mod cloner;
mod error;
mod inverse;
mod policy;

pub use cloner::GraphCloner;
pub use error::{CloneError, CloneResult};
