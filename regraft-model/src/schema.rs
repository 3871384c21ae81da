//! Node schemas and the schema registry.
//!
//! A [`NodeSchema`] is the statically built descriptor table for one node
//! type: how to construct a blank instance and which fields it has, in
//! traversal order. The [`SchemaRegistry`] collects schemas and answers the
//! questions the cloner asks: is this value a node, what are its fields,
//! can this declared type hold that runtime type.

use crate::descriptor::{FieldDescriptor, RelationshipKind};
use crate::{CollectionKind, NodeRef};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;

type FactoryFn = Box<dyn Fn() -> NodeRef + Send + Sync>;

/// Static description of one node type: identity, blank construction, and
/// the ordered list of its fields.
pub struct NodeSchema {
    type_name: &'static str,
    type_id: TypeId,
    parent: Option<TypeId>,
    factory: FactoryFn,
    fields: Vec<FieldDescriptor>,
}

impl NodeSchema {
    /// Schema for a type whose blank instances come from `Default`.
    #[must_use]
    pub fn of<T: Default + 'static>(name: &'static str) -> Self {
        Self::with_factory::<T>(name, T::default)
    }

    /// Schema with an explicit blank-instance factory.
    #[must_use]
    pub fn with_factory<T: 'static>(name: &'static str, factory: fn() -> T) -> Self {
        Self {
            type_name: name,
            type_id: TypeId::of::<T>(),
            parent: None,
            factory: Box::new(move || NodeRef::new(factory())),
            fields: Vec::new(),
        }
    }

    /// Declares `P` as this type's conceptual supertype.
    ///
    /// Rust has no subclassing; the declared chain feeds assignability
    /// checks (subtype-scoped ignore rules, back-reference candidacy).
    /// Field lists are always declared in full on each schema.
    #[must_use]
    pub fn subtype_of<P: 'static>(mut self) -> Self {
        self.parent = Some(TypeId::of::<P>());
        self
    }

    /// Appends a field descriptor. Declaration order is traversal order.
    #[must_use]
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    /// Short name the schema was registered under.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `TypeId` of the described node type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Declared supertype, if any.
    #[must_use]
    pub fn parent(&self) -> Option<TypeId> {
        self.parent
    }

    /// All fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The field named `name`, if declared.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Constructs a blank instance of this type.
    #[must_use]
    pub fn construct_blank(&self) -> NodeRef {
        (self.factory)()
    }
}

/// Registry of node schemas.
///
/// The single source of truth for "is this value a node" and for every
/// metadata question asked during cloning. Registries are immutable once
/// built and safe to share across threads and clone calls; declarations do
/// not change at runtime.
#[derive(Default)]
pub struct SchemaRegistry {
    types: HashMap<TypeId, NodeSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, replacing any earlier schema for the same type.
    pub fn register(&mut self, schema: NodeSchema) -> &mut Self {
        self.types.insert(schema.type_id(), schema);
        self
    }

    /// The schema registered for `type_id`, if any.
    #[must_use]
    pub fn schema_of(&self, type_id: TypeId) -> Option<&NodeSchema> {
        self.types.get(&type_id)
    }

    /// The schema for a node's runtime type, if registered.
    #[must_use]
    pub fn schema_for(&self, node: &NodeRef) -> Option<&NodeSchema> {
        self.schema_of(node.node_type())
    }

    /// The node classifier: a value is a node iff its type is registered.
    #[must_use]
    pub fn is_node(&self, node: &NodeRef) -> bool {
        self.types.contains_key(&node.node_type())
    }

    /// True when `concrete` is `base` or declares `base` somewhere in its
    /// supertype chain.
    #[must_use]
    pub fn is_assignable(&self, base: TypeId, concrete: TypeId) -> bool {
        let mut current = Some(concrete);
        while let Some(type_id) = current {
            if type_id == base {
                return true;
            }
            current = self.types.get(&type_id).and_then(NodeSchema::parent);
        }
        false
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Serializable snapshot of the declarative metadata, for logging and
    /// debug tooling. Types are sorted by name for stable output.
    #[must_use]
    pub fn describe(&self) -> RegistrySummary {
        let mut types: Vec<SchemaSummary> = self
            .types
            .values()
            .map(|schema| SchemaSummary {
                type_name: schema.type_name().to_string(),
                fields: schema.fields().iter().map(summarize_field).collect(),
            })
            .collect();
        types.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        RegistrySummary { types }
    }

    /// Advisory consistency check over declared inverse names.
    ///
    /// Findings never affect cloning — an inverse name that resolves to
    /// nothing simply means no back-reference is fixed up for that pairing.
    #[must_use]
    pub fn lint(&self) -> Vec<LintFinding> {
        let mut findings = Vec::new();
        let mut schemas: Vec<&NodeSchema> = self.types.values().collect();
        schemas.sort_by_key(|schema| schema.type_name());

        for schema in schemas {
            for field in schema.fields() {
                let Some(relationship) = field.relationship() else {
                    continue;
                };
                let Some(mapped_by) = relationship.mapped_by() else {
                    continue;
                };
                let target = match relationship.kind() {
                    RelationshipKind::OneToOne => field.declared_node_type(),
                    RelationshipKind::OneToMany => field.declared_item_type(),
                    // mapped_by is never read on the many side
                    RelationshipKind::ManyToOne => None,
                };
                let Some(target) = target else { continue };

                let finding = self.lint_pairing(schema, field, relationship.kind(), mapped_by, target);
                findings.extend(finding);
            }
        }
        findings
    }

    fn lint_pairing(
        &self,
        schema: &NodeSchema,
        field: &FieldDescriptor,
        forward_kind: RelationshipKind,
        mapped_by: &str,
        target: TypeId,
    ) -> Option<LintFinding> {
        let Some(target_schema) = self.schema_of(target) else {
            return Some(LintFinding::UnregisteredTarget {
                type_name: schema.type_name().to_string(),
                field: field.name().to_string(),
            });
        };
        let Some(inverse) = target_schema.field_named(mapped_by) else {
            return Some(LintFinding::UnresolvedInverse {
                type_name: schema.type_name().to_string(),
                field: field.name().to_string(),
                mapped_by: mapped_by.to_string(),
            });
        };
        let legal = match forward_kind {
            RelationshipKind::OneToOne => {
                inverse.relationship_kind() == Some(RelationshipKind::OneToOne)
            }
            RelationshipKind::OneToMany => matches!(
                inverse.relationship_kind(),
                Some(RelationshipKind::ManyToOne) | Some(RelationshipKind::OneToOne)
            ),
            RelationshipKind::ManyToOne => true,
        };
        if legal {
            None
        } else {
            Some(LintFinding::MismatchedInverse {
                type_name: schema.type_name().to_string(),
                field: field.name().to_string(),
                mapped_by: mapped_by.to_string(),
                found_kind: inverse.relationship_kind(),
            })
        }
    }
}

fn summarize_field(field: &FieldDescriptor) -> FieldSummary {
    FieldSummary {
        name: field.name().to_string(),
        identifier: field.is_identifier(),
        immutable: field.is_immutable(),
        force_clone: field.is_force_clone(),
        relationship: field.relationship_kind(),
        mapped_by: field
            .relationship()
            .and_then(|r| r.mapped_by())
            .map(str::to_string),
        collection: field.collection_kind(),
        ignore: field.ignore_rule().map(|rule| IgnoreSummary {
            null_on_clone: rule.nulls_on_clone(),
            scoped: !rule.is_unconditional(),
        }),
    }
}

/// Serializable snapshot of a registry's declarative metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySummary {
    pub types: Vec<SchemaSummary>,
}

/// One registered type in a [`RegistrySummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub type_name: String,
    pub fields: Vec<FieldSummary>,
}

/// One field in a [`SchemaSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name: String,
    pub identifier: bool,
    pub immutable: bool,
    pub force_clone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<IgnoreSummary>,
}

/// Ignore-rule shape in a [`FieldSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreSummary {
    pub null_on_clone: bool,
    pub scoped: bool,
}

/// An advisory inconsistency between a declared inverse name and the
/// target type's declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintFinding {
    /// The relationship's target type has no registered schema.
    UnregisteredTarget { type_name: String, field: String },
    /// `mapped_by` names no field on the target type.
    UnresolvedInverse {
        type_name: String,
        field: String,
        mapped_by: String,
    },
    /// `mapped_by` resolves to a field whose kind cannot be the inverse.
    MismatchedInverse {
        type_name: String,
        field: String,
        mapped_by: String,
        found_kind: Option<RelationshipKind>,
    },
}
