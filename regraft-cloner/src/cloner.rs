//! The graph cloner.

use crate::arena::CloneCache;
use crate::error::{CloneError, CloneResult};
use crate::inverse::find_inverse;
use crate::policy::{FieldAction, plan_field};
use regraft_model::{
    FieldAccess, FieldDescriptor, NodeRef, NodeSchema, RelationshipKind, SchemaRegistry,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Produces insert-ready deep copies of node graphs.
///
/// Every call to [`GraphCloner::clone_graph`] builds its own identity
/// cache, so calls on overlapping graphs are independent and produce
/// independent copies. Original nodes are never mutated; all writes target
/// freshly constructed copies.
pub struct GraphCloner<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> GraphCloner<'r> {
    /// Creates a cloner over a registry of node schemas.
    #[must_use]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Deep-copies the graph reachable from `root`.
    ///
    /// The root must be a registered node type. Everything reachable
    /// through followed relationship fields is copied exactly once per
    /// call, cycles included; the copy of the root is returned.
    pub fn clone_graph(&self, root: &NodeRef) -> CloneResult<NodeRef> {
        let mut cache = CloneCache::new();
        let copy = self.copy_node(root, &mut cache)?;
        debug!("cloned graph rooted at {} ({} nodes)", root.type_name(), cache.len());
        Ok(copy)
    }

    /// Typed convenience over [`GraphCloner::clone_graph`].
    pub fn clone_node<T: 'static>(&self, root: &Rc<RefCell<T>>) -> CloneResult<Rc<RefCell<T>>> {
        let copy = self.clone_graph(&NodeRef::from_rc(Rc::clone(root)))?;
        copy.downcast::<T>().ok_or(CloneError::UnregisteredType {
            type_name: copy.type_name(),
        })
    }

    fn copy_node(&self, original: &NodeRef, cache: &mut CloneCache) -> CloneResult<NodeRef> {
        if let Some(existing) = cache.get(original) {
            trace!("cache hit for {}", original.type_name());
            return Ok(existing);
        }

        let schema =
            self.registry
                .schema_for(original)
                .ok_or(CloneError::UnregisteredType {
                    type_name: original.type_name(),
                })?;
        let copy = schema.construct_blank();
        // The copy must be in the cache before any field is processed: a
        // cycle back to `original` has to resolve to this same instance.
        cache.insert(original, &copy);
        debug!("copying {} node", schema.type_name());

        for field in schema.fields() {
            self.apply_field(schema, field, original, &copy, cache)?;
        }

        Ok(copy)
    }

    fn apply_field(
        &self,
        schema: &NodeSchema,
        field: &FieldDescriptor,
        original: &NodeRef,
        copy: &NodeRef,
        cache: &mut CloneCache,
    ) -> CloneResult<()> {
        let action = plan_field(self.registry, schema.type_id(), schema.type_name(), field, original)?;
        trace!("{}.{}: {:?}", schema.type_name(), field.name(), action);

        let wrap = |source| CloneError::FieldAccess {
            type_name: schema.type_name(),
            field: field.name(),
            source,
        };

        match (action, field.access()) {
            (FieldAction::Skip, _) => {}
            (FieldAction::CopyValue, FieldAccess::Value { copy: copy_value }) => {
                copy_value(original, copy).map_err(wrap)?;
            }
            (FieldAction::ShareNode(value), FieldAccess::Node { set, .. }) => {
                set(copy, value).map_err(wrap)?;
            }
            (FieldAction::CloneNode(child), FieldAccess::Node { set, .. }) => {
                let child_copy = self.copy_node(&child, cache)?;
                self.link_one_to_one_inverse(schema, field, &child, &child_copy, copy)?;
                set(copy, Some(child_copy)).map_err(wrap)?;
            }
            (FieldAction::ShareCollection(items), FieldAccess::Collection { set, .. }) => {
                set(copy, items).map_err(wrap)?;
            }
            (FieldAction::CloneCollection(items), FieldAccess::Collection { set, .. }) => {
                let copies = self.copy_collection_items(schema, field, items, copy, cache)?;
                set(copy, copies).map_err(wrap)?;
            }
            // plan_field only pairs an action with its matching access shape
            _ => {}
        }
        Ok(())
    }

    /// Copies the items of a one-to-many collection, re-pointing each item
    /// copy's inverse field (many-to-one first, then one-to-one) at the
    /// owner's copy. Items that are not nodes are dropped, not copied.
    fn copy_collection_items(
        &self,
        schema: &NodeSchema,
        field: &FieldDescriptor,
        items: Vec<NodeRef>,
        owner_copy: &NodeRef,
        cache: &mut CloneCache,
    ) -> CloneResult<Vec<NodeRef>> {
        let mut copies = Vec::with_capacity(items.len());
        for item in items {
            if !self.registry.is_node(&item) {
                trace!(
                    "{}.{}: dropping non-node item {}",
                    schema.type_name(),
                    field.name(),
                    item.type_name()
                );
                continue;
            }
            let item_copy = self.copy_node(&item, cache)?;
            let inverse = find_inverse(
                self.registry,
                item.node_type(),
                schema.type_id(),
                field,
                RelationshipKind::OneToMany,
                RelationshipKind::ManyToOne,
            )
            .or_else(|| {
                find_inverse(
                    self.registry,
                    item.node_type(),
                    schema.type_id(),
                    field,
                    RelationshipKind::OneToOne,
                    RelationshipKind::OneToOne,
                )
            });
            if let Some(inverse) = inverse {
                set_back_reference(item.type_name(), inverse, &item_copy, owner_copy)?;
            }
            copies.push(item_copy);
        }
        Ok(copies)
    }

    /// After cloning a single-node field, points a declared one-to-one
    /// inverse on the child copy back at the owner's copy.
    fn link_one_to_one_inverse(
        &self,
        schema: &NodeSchema,
        field: &FieldDescriptor,
        child: &NodeRef,
        child_copy: &NodeRef,
        owner_copy: &NodeRef,
    ) -> CloneResult<()> {
        let inverse = find_inverse(
            self.registry,
            child.node_type(),
            schema.type_id(),
            field,
            RelationshipKind::OneToOne,
            RelationshipKind::OneToOne,
        );
        if let Some(inverse) = inverse {
            set_back_reference(child.type_name(), inverse, child_copy, owner_copy)?;
        }
        Ok(())
    }
}

/// Writes a back-reference through an inverse field. Inverse candidates are
/// always single-node fields by construction of the inverse search.
fn set_back_reference(
    type_name: &'static str,
    field: &FieldDescriptor,
    node: &NodeRef,
    value: &NodeRef,
) -> CloneResult<()> {
    if let FieldAccess::Node { set, .. } = field.access() {
        set(node, Some(value.clone())).map_err(|source| CloneError::FieldAccess {
            type_name,
            field: field.name(),
            source,
        })?;
    }
    Ok(())
}
