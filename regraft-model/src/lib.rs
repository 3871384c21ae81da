//! Declarative model for regraft.
//!
//! This crate defines everything the cloner consults but never invents:
//! - [`NodeRef`] — type-erased, shared handle to one node instance
//! - [`FieldDescriptor`] — per-field metadata (identifier, relationship,
//!   force-clone, ignore rules) together with type-erased accessors
//! - [`NodeSchema`] — a node type's blank-instance factory and ordered
//!   field list
//! - [`SchemaRegistry`] — the registered-type table; also the node
//!   classifier and the declared-supertype (assignability) oracle
//!
//! Registration is explicit and static: for each node type the caller
//! declares its fields once with plain `fn` accessors against the concrete
//! type. There is no runtime introspection — the cloner only ever walks
//! these tables.

mod collections;
mod descriptor;
mod node;
mod schema;

pub use collections::{CollectionKind, NodeSet};
pub use descriptor::{
    AccessError, FieldAccess, FieldDescriptor, IgnoreRule, Relationship, RelationshipKind,
};
pub use node::NodeRef;
pub use schema::{
    FieldSummary, IgnoreSummary, LintFinding, NodeSchema, RegistrySummary, SchemaRegistry,
    SchemaSummary,
};
