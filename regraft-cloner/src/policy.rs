//! Field-policy evaluation.
//!
//! Decides, per field of the node being copied, what the cloner does with
//! it. Evaluated on every clone call rather than cached: keep-original
//! ignore rules depend on the owning node's runtime type.

use crate::error::{CloneError, CloneResult};
use regraft_model::{
    FieldAccess, FieldDescriptor, IgnoreRule, NodeRef, RelationshipKind, SchemaRegistry,
};
use std::any::TypeId;

/// What the cloner does with one field of one node.
#[derive(Debug)]
pub(crate) enum FieldAction {
    /// Leave the copy's field at its blank-construction default.
    Skip,
    /// Copy the plain value wholesale.
    CopyValue,
    /// Point the copy's field at a value shared with the original graph.
    ShareNode(Option<NodeRef>),
    /// Recursively clone the referenced node.
    CloneNode(NodeRef),
    /// New container, items shared with the original graph.
    ShareCollection(Vec<NodeRef>),
    /// New container, items recursively cloned and back-references fixed.
    CloneCollection(Vec<NodeRef>),
}

pub(crate) fn plan_field(
    registry: &SchemaRegistry,
    owner_type: TypeId,
    owner_type_name: &'static str,
    field: &FieldDescriptor,
    original: &NodeRef,
) -> CloneResult<FieldAction> {
    // Identifier, immutable and null-on-clone fields are never even read.
    // Force-clone overrides only the identifier skip, and null rules fire
    // regardless of their subtype scope.
    if (field.is_identifier() && !field.is_force_clone())
        || field.is_immutable()
        || field.ignore_rule().is_some_and(IgnoreRule::nulls_on_clone)
    {
        return Ok(FieldAction::Skip);
    }

    let wrap = |source| CloneError::FieldAccess {
        type_name: owner_type_name,
        field: field.name(),
        source,
    };

    match field.access() {
        FieldAccess::Value { .. } => Ok(FieldAction::CopyValue),
        FieldAccess::Node { get, .. } => {
            let value = get(original).map_err(wrap)?;
            match value {
                Some(node) if registry.is_node(&node) && follows(registry, owner_type, field) => {
                    Ok(FieldAction::CloneNode(node))
                }
                // Unfollowed node values keep the original reference, even
                // when that node was already cloned along another path.
                other => Ok(FieldAction::ShareNode(other)),
            }
        }
        FieldAccess::Collection { get, .. } => {
            let items = get(original).map_err(wrap)?;
            if field.relationship_kind() == Some(RelationshipKind::OneToMany) {
                Ok(FieldAction::CloneCollection(items))
            } else {
                Ok(FieldAction::ShareCollection(items))
            }
        }
    }
}

/// A node value is followed unless the field is a plain many-to-one or a
/// keep-original ignore rule matches the owner's runtime type; force-clone
/// overrides both.
fn follows(registry: &SchemaRegistry, owner_type: TypeId, field: &FieldDescriptor) -> bool {
    if field.is_force_clone() {
        return true;
    }
    if field.relationship_kind() == Some(RelationshipKind::ManyToOne) {
        return false;
    }
    !field
        .ignore_rule()
        .is_some_and(|rule| rule.applies_to(registry, owner_type))
}
