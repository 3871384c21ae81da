//! Inverse-field (back-reference) resolution.
//!
//! Given the owning side of a bidirectional relationship, finds the
//! declared inverse field on the other side so that child copies can be
//! re-pointed at the owner's copy instead of the original owner.

use regraft_model::{FieldDescriptor, RelationshipKind, SchemaRegistry};
use std::any::TypeId;

/// Finds the field on `item_type` that is the declared inverse of `forward`.
///
/// The forward field must itself be declared with `forward_kind` and carry
/// a non-blank inverse name. A candidate on the item side qualifies when
/// its kind equals `inverse_kind`, its declared type can hold the owner,
/// and its name matches the inverse name exactly. `None` means the pairing
/// is unidirectional or not mapped from this side — a normal outcome, not
/// an error.
pub(crate) fn find_inverse<'r>(
    registry: &'r SchemaRegistry,
    item_type: TypeId,
    owner_type: TypeId,
    forward: &FieldDescriptor,
    forward_kind: RelationshipKind,
    inverse_kind: RelationshipKind,
) -> Option<&'r FieldDescriptor> {
    let relationship = forward
        .relationship()
        .filter(|relationship| relationship.kind() == forward_kind)?;
    let mapped_by = relationship.mapped_by()?;
    let schema = registry.schema_of(item_type)?;

    schema.fields().iter().find(|candidate| {
        candidate.relationship_kind() == Some(inverse_kind)
            && candidate
                .declared_node_type()
                .is_some_and(|declared| registry.is_assignable(declared, owner_type))
            && candidate.name() == mapped_by
    })
}
