//! Field descriptors: declarative metadata plus type-erased accessors.
//!
//! Registration is the explicit step that replaces reflection: for each
//! node type the caller lists its fields with plain `fn` accessors against
//! the concrete type, and the shorthand constructors here erase them behind
//! [`NodeRef`] so the cloner can traverse heterogeneous graphs without
//! naming a single concrete type.

use crate::schema::SchemaRegistry;
use crate::{CollectionKind, NodeRef, NodeSet};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Cardinality of a relationship field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
}

/// Relationship metadata declared on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    kind: RelationshipKind,
    mapped_by: Option<&'static str>,
}

impl Relationship {
    fn new(kind: RelationshipKind, mapped_by: Option<&'static str>) -> Self {
        // A blank inverse name means "not mapped from this side".
        let mapped_by = mapped_by.filter(|name| !name.trim().is_empty());
        Self { kind, mapped_by }
    }

    /// The declared cardinality.
    #[must_use]
    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    /// Inverse-field name declared on this (owning) side, if any.
    #[must_use]
    pub fn mapped_by(&self) -> Option<&'static str> {
        self.mapped_by
    }
}

/// Suppresses cloning of a field: the copy's field is either left at its
/// default value or keeps the original (un-cloned) reference, optionally
/// narrowed to declared subtypes of the owning node.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRule {
    scope: Vec<TypeId>,
    null_on_clone: bool,
}

impl IgnoreRule {
    /// The copy's field is left at its blank-construction default.
    ///
    /// Null rules fire for every owning type; the subtype scope only ever
    /// narrows keep-original rules.
    #[must_use]
    pub fn null_on_clone() -> Self {
        Self {
            scope: Vec::new(),
            null_on_clone: true,
        }
    }

    /// The copy's field keeps the original reference instead of a clone.
    #[must_use]
    pub fn keep_original() -> Self {
        Self {
            scope: Vec::new(),
            null_on_clone: false,
        }
    }

    /// Narrows the rule to owners of type `T` or its declared subtypes.
    #[must_use]
    pub fn for_subtype<T: 'static>(mut self) -> Self {
        self.scope.push(TypeId::of::<T>());
        self
    }

    /// True when the rule nulls the field instead of keeping the original.
    #[must_use]
    pub fn nulls_on_clone(&self) -> bool {
        self.null_on_clone
    }

    /// True when no subtype scope was declared.
    #[must_use]
    pub fn is_unconditional(&self) -> bool {
        self.scope.is_empty()
    }

    /// True when the rule applies to an owner of the given runtime type.
    #[must_use]
    pub fn applies_to(&self, registry: &SchemaRegistry, owner: TypeId) -> bool {
        self.scope.is_empty()
            || self
                .scope
                .iter()
                .any(|base| registry.is_assignable(*base, owner))
    }
}

/// Failure inside a field accessor. Always fatal to the in-progress clone.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The node handed to an accessor is not the type it was built for.
    #[error("node is not a `{expected}`")]
    NodeType { expected: &'static str },

    /// A value written through an accessor has the wrong node type.
    #[error("value is not a `{expected}`")]
    ValueType { expected: &'static str },

    /// The node's cell is already borrowed.
    #[error("node is already borrowed")]
    Borrowed,
}

type ValueCopyFn = Box<dyn Fn(&NodeRef, &NodeRef) -> Result<(), AccessError> + Send + Sync>;
type NodeGetFn = Box<dyn Fn(&NodeRef) -> Result<Option<NodeRef>, AccessError> + Send + Sync>;
type NodeSetFn = Box<dyn Fn(&NodeRef, Option<NodeRef>) -> Result<(), AccessError> + Send + Sync>;
type ItemsGetFn = Box<dyn Fn(&NodeRef) -> Result<Vec<NodeRef>, AccessError> + Send + Sync>;
type ItemsSetFn = Box<dyn Fn(&NodeRef, Vec<NodeRef>) -> Result<(), AccessError> + Send + Sync>;

/// Type-erased access to one field, shaped by what the field holds.
pub enum FieldAccess {
    /// A plain value (or plain-value collection), copied wholesale from the
    /// original node onto the copy.
    Value { copy: ValueCopyFn },
    /// A single node reference. `declared` is the field's declared node
    /// type, consulted when the field is a back-reference candidate.
    Node {
        declared: TypeId,
        get: NodeGetFn,
        set: NodeSetFn,
    },
    /// A collection of node references. `get` yields items in iteration
    /// order; `set` rebuilds the concrete typed container from scratch, so
    /// the written collection is never the original instance.
    /// `declared_item` is `None` for type-erased collections.
    Collection {
        kind: CollectionKind,
        declared_item: Option<TypeId>,
        get: ItemsGetFn,
        set: ItemsSetFn,
    },
}

impl fmt::Debug for FieldAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value { .. } => f.write_str("Value"),
            Self::Node { .. } => f.write_str("Node"),
            Self::Collection { kind, .. } => write!(f, "Collection({kind:?})"),
        }
    }
}

fn typed<E: 'static>(node: &NodeRef) -> Result<Rc<RefCell<E>>, AccessError> {
    node.downcast::<E>().ok_or(AccessError::NodeType {
        expected: std::any::type_name::<E>(),
    })
}

fn typed_value<V: 'static>(node: NodeRef) -> Result<Rc<RefCell<V>>, AccessError> {
    node.downcast::<V>().ok_or(AccessError::ValueType {
        expected: std::any::type_name::<V>(),
    })
}

/// One field of a registered node type: metadata and accessors together.
///
/// Built through the shorthand constructors ([`FieldDescriptor::value`],
/// [`FieldDescriptor::id`], [`FieldDescriptor::reference`],
/// [`FieldDescriptor::sequence`], [`FieldDescriptor::unique_set`], ...)
/// then refined with the builder methods (`many_to_one`,
/// `one_to_many_mapped_by`, `force_clone`, `ignore`, ...).
pub struct FieldDescriptor {
    name: &'static str,
    identifier: bool,
    immutable: bool,
    force_clone: bool,
    ignore: Option<IgnoreRule>,
    relationship: Option<Relationship>,
    access: FieldAccess,
}

impl FieldDescriptor {
    fn with_access(name: &'static str, access: FieldAccess) -> Self {
        Self {
            name,
            identifier: false,
            immutable: false,
            force_clone: false,
            ignore: None,
            relationship: None,
            access,
        }
    }

    /// A plain-value field, copied wholesale from original to copy.
    #[must_use]
    pub fn value<E: 'static, V: Clone + 'static>(
        name: &'static str,
        get: fn(&E) -> V,
        set: fn(&mut E, V),
    ) -> Self {
        let copy: ValueCopyFn = Box::new(move |source, target| {
            let source = typed::<E>(source)?;
            let target = typed::<E>(target)?;
            let value = {
                let guard = source.try_borrow().map_err(|_| AccessError::Borrowed)?;
                get(&guard)
            };
            let mut guard = target.try_borrow_mut().map_err(|_| AccessError::Borrowed)?;
            set(&mut guard, value);
            Ok(())
        });
        Self::with_access(name, FieldAccess::Value { copy })
    }

    /// An identifier field: a plain value that is skipped by default so the
    /// copy can be persisted as a new record.
    #[must_use]
    pub fn id<E: 'static, V: Clone + 'static>(
        name: &'static str,
        get: fn(&E) -> V,
        set: fn(&mut E, V),
    ) -> Self {
        let mut descriptor = Self::value(name, get, set);
        descriptor.identifier = true;
        descriptor
    }

    /// A single-node reference field.
    #[must_use]
    pub fn reference<E: 'static, V: 'static>(
        name: &'static str,
        get: fn(&E) -> Option<Rc<RefCell<V>>>,
        set: fn(&mut E, Option<Rc<RefCell<V>>>),
    ) -> Self {
        let get_fn: NodeGetFn = Box::new(move |node| {
            let cell = typed::<E>(node)?;
            let guard = cell.try_borrow().map_err(|_| AccessError::Borrowed)?;
            Ok(get(&guard).map(NodeRef::from_rc))
        });
        let set_fn: NodeSetFn = Box::new(move |node, value| {
            let cell = typed::<E>(node)?;
            let value = value.map(typed_value::<V>).transpose()?;
            let mut guard = cell.try_borrow_mut().map_err(|_| AccessError::Borrowed)?;
            set(&mut guard, value);
            Ok(())
        });
        Self::with_access(
            name,
            FieldAccess::Node {
                declared: TypeId::of::<V>(),
                get: get_fn,
                set: set_fn,
            },
        )
    }

    /// An ordered-sequence collection field (`Vec` of node handles).
    #[must_use]
    pub fn sequence<E: 'static, V: 'static>(
        name: &'static str,
        get: fn(&E) -> Vec<Rc<RefCell<V>>>,
        set: fn(&mut E, Vec<Rc<RefCell<V>>>),
    ) -> Self {
        Self::collection_of(name, CollectionKind::OrderedSequence, get, set)
    }

    /// A unique-set collection field ([`NodeSet`] of node handles).
    #[must_use]
    pub fn unique_set<E: 'static, V: 'static>(
        name: &'static str,
        get: fn(&E) -> NodeSet<V>,
        set: fn(&mut E, NodeSet<V>),
    ) -> Self {
        Self::collection_of(name, CollectionKind::UniqueSet, get, set)
    }

    /// A collection field over any container that can be rebuilt from its
    /// items. The container's own `FromIterator` is the blank-construction
    /// path, so whatever kind goes in comes back out.
    #[must_use]
    pub fn collection_of<E: 'static, V: 'static, C>(
        name: &'static str,
        kind: CollectionKind,
        get: fn(&E) -> C,
        set: fn(&mut E, C),
    ) -> Self
    where
        C: IntoIterator<Item = Rc<RefCell<V>>> + FromIterator<Rc<RefCell<V>>> + 'static,
    {
        let get_fn: ItemsGetFn = Box::new(move |node| {
            let cell = typed::<E>(node)?;
            let items = {
                let guard = cell.try_borrow().map_err(|_| AccessError::Borrowed)?;
                get(&guard)
            };
            Ok(items.into_iter().map(NodeRef::from_rc).collect())
        });
        let set_fn: ItemsSetFn = Box::new(move |node, items| {
            let cell = typed::<E>(node)?;
            let rebuilt = items
                .into_iter()
                .map(typed_value::<V>)
                .collect::<Result<C, AccessError>>()?;
            let mut guard = cell.try_borrow_mut().map_err(|_| AccessError::Borrowed)?;
            set(&mut guard, rebuilt);
            Ok(())
        });
        Self::with_access(
            name,
            FieldAccess::Collection {
                kind,
                declared_item: Some(TypeId::of::<V>()),
                get: get_fn,
                set: set_fn,
            },
        )
    }

    /// An ordered collection field whose items stay type-erased.
    ///
    /// For heterogeneous collections (mixed declared subtypes, or payloads
    /// that are not nodes at all). Non-node items in such a collection are
    /// dropped when the field is cloned as a one-to-many relationship.
    #[must_use]
    pub fn sequence_of_refs<E: 'static>(
        name: &'static str,
        get: fn(&E) -> Vec<NodeRef>,
        set: fn(&mut E, Vec<NodeRef>),
    ) -> Self {
        let get_fn: ItemsGetFn = Box::new(move |node| {
            let cell = typed::<E>(node)?;
            let guard = cell.try_borrow().map_err(|_| AccessError::Borrowed)?;
            Ok(get(&guard))
        });
        let set_fn: ItemsSetFn = Box::new(move |node, items| {
            let cell = typed::<E>(node)?;
            let mut guard = cell.try_borrow_mut().map_err(|_| AccessError::Borrowed)?;
            set(&mut guard, items);
            Ok(())
        });
        Self::with_access(
            name,
            FieldAccess::Collection {
                kind: CollectionKind::OrderedSequence,
                declared_item: None,
                get: get_fn,
                set: set_fn,
            },
        )
    }

    // ── Builder methods ──────────────────────────────────────────────

    /// Declares an unmapped one-to-one relationship.
    #[must_use]
    pub fn one_to_one(mut self) -> Self {
        self.relationship = Some(Relationship::new(RelationshipKind::OneToOne, None));
        self
    }

    /// Declares a one-to-one relationship whose inverse on the other side
    /// is the field named `inverse`.
    #[must_use]
    pub fn one_to_one_mapped_by(mut self, inverse: &'static str) -> Self {
        self.relationship = Some(Relationship::new(RelationshipKind::OneToOne, Some(inverse)));
        self
    }

    /// Declares an unmapped one-to-many relationship.
    #[must_use]
    pub fn one_to_many(mut self) -> Self {
        self.relationship = Some(Relationship::new(RelationshipKind::OneToMany, None));
        self
    }

    /// Declares a one-to-many relationship whose inverse on the item side
    /// is the field named `inverse`.
    #[must_use]
    pub fn one_to_many_mapped_by(mut self, inverse: &'static str) -> Self {
        self.relationship = Some(Relationship::new(
            RelationshipKind::OneToMany,
            Some(inverse),
        ));
        self
    }

    /// Declares a many-to-one relationship (never the mapped side).
    #[must_use]
    pub fn many_to_one(mut self) -> Self {
        self.relationship = Some(Relationship::new(RelationshipKind::ManyToOne, None));
        self
    }

    /// Always recurse-clone this field, overriding the identifier skip and
    /// the no-follow defaults for many-to-one and ignored fields.
    #[must_use]
    pub fn force_clone(mut self) -> Self {
        self.force_clone = true;
        self
    }

    /// Marks the field set-once: never copied, the copy keeps its default.
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Attaches an ignore rule.
    #[must_use]
    pub fn ignore(mut self, rule: IgnoreRule) -> Self {
        self.ignore = Some(rule);
        self
    }

    // ── Metadata accessors ───────────────────────────────────────────

    /// Field name, as declared.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True for identifier fields.
    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.identifier
    }

    /// True for set-once fields.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// True when cloning is forced for this field.
    #[must_use]
    pub fn is_force_clone(&self) -> bool {
        self.force_clone
    }

    /// The attached ignore rule, if any.
    #[must_use]
    pub fn ignore_rule(&self) -> Option<&IgnoreRule> {
        self.ignore.as_ref()
    }

    /// The declared relationship, if any.
    #[must_use]
    pub fn relationship(&self) -> Option<Relationship> {
        self.relationship
    }

    /// Shorthand for the declared relationship kind.
    #[must_use]
    pub fn relationship_kind(&self) -> Option<RelationshipKind> {
        self.relationship.map(|r| r.kind())
    }

    /// The erased accessors.
    #[must_use]
    pub fn access(&self) -> &FieldAccess {
        &self.access
    }

    /// Declared node type of a single-node field.
    #[must_use]
    pub fn declared_node_type(&self) -> Option<TypeId> {
        match &self.access {
            FieldAccess::Node { declared, .. } => Some(*declared),
            _ => None,
        }
    }

    /// Collection kind of a collection field.
    #[must_use]
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match &self.access {
            FieldAccess::Collection { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Declared item type of a typed collection field.
    #[must_use]
    pub fn declared_item_type(&self) -> Option<TypeId> {
        match &self.access {
            FieldAccess::Collection { declared_item, .. } => *declared_item,
            _ => None,
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("immutable", &self.immutable)
            .field("force_clone", &self.force_clone)
            .field("relationship", &self.relationship)
            .field("access", &self.access)
            .finish()
    }
}
