#![allow(dead_code)]

//! Shared fixture graph: a small order-management model exercising every
//! field policy — identifiers, immutable fields, plain values, many-to-one,
//! one-to-many (ordered and unique-set), one-to-one with inverses, ignore
//! rules and force-clone.

use regraft_model::{
    FieldDescriptor, IgnoreRule, NodeRef, NodeSchema, NodeSet, SchemaRegistry,
};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

#[derive(Default)]
pub struct Order {
    pub id: Option<Uuid>,
    pub total_cents: i64,
    pub created_at: i64,
    pub tags: Vec<String>,
    pub customer: Option<Shared<Customer>>,
    pub items: Vec<Shared<LineItem>>,
    pub invoice: Option<Shared<Invoice>>,
    pub attachments: Vec<Shared<Attachment>>,
    pub audit_token: Option<Shared<AuditToken>>,
    pub warehouse: Option<Shared<Warehouse>>,
}

#[derive(Default)]
pub struct LineItem {
    pub id: Option<Uuid>,
    pub sku: String,
    pub quantity: u32,
    pub order: Option<Shared<Order>>,
    pub product: Option<Shared<Product>>,
}

#[derive(Default)]
pub struct Invoice {
    pub id: Option<Uuid>,
    pub number: String,
    pub order: Option<Shared<Order>>,
}

#[derive(Default)]
pub struct Customer {
    pub id: Option<Uuid>,
    pub name: String,
    pub segments: NodeSet<Segment>,
}

#[derive(Default)]
pub struct Segment {
    pub id: Option<Uuid>,
    pub label: String,
}

#[derive(Default)]
pub struct Product {
    pub id: Option<Uuid>,
    pub name: String,
}

#[derive(Default)]
pub struct Attachment {
    pub id: Option<Uuid>,
    pub file_name: String,
}

#[derive(Default)]
pub struct AuditToken {
    pub value: String,
}

#[derive(Default)]
pub struct Warehouse {
    pub id: Option<Uuid>,
    pub code: String,
}

/// Self-referencing type for cycle tests.
#[derive(Default)]
pub struct Category {
    pub id: Option<Uuid>,
    pub name: String,
    pub parent: Option<Shared<Category>>,
}

/// Heterogeneous one-to-many container for mixed-payload tests.
#[derive(Default)]
pub struct Batch {
    pub id: Option<Uuid>,
    pub entries: Vec<NodeRef>,
}

pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    registry.register(
        NodeSchema::of::<Order>("Order")
            .field(FieldDescriptor::id("id", |o: &Order| o.id, |o, v| o.id = v))
            .field(FieldDescriptor::value(
                "total_cents",
                |o: &Order| o.total_cents,
                |o, v| o.total_cents = v,
            ))
            .field(
                FieldDescriptor::value(
                    "created_at",
                    |o: &Order| o.created_at,
                    |o, v| o.created_at = v,
                )
                .immutable(),
            )
            .field(FieldDescriptor::value(
                "tags",
                |o: &Order| o.tags.clone(),
                |o, v| o.tags = v,
            ))
            .field(
                FieldDescriptor::reference(
                    "customer",
                    |o: &Order| o.customer.clone(),
                    |o, v| o.customer = v,
                )
                .many_to_one(),
            )
            .field(
                FieldDescriptor::sequence(
                    "items",
                    |o: &Order| o.items.clone(),
                    |o, v| o.items = v,
                )
                .one_to_many_mapped_by("order"),
            )
            .field(
                FieldDescriptor::reference(
                    "invoice",
                    |o: &Order| o.invoice.clone(),
                    |o, v| o.invoice = v,
                )
                .one_to_one_mapped_by("order"),
            )
            .field(FieldDescriptor::sequence(
                "attachments",
                |o: &Order| o.attachments.clone(),
                |o, v| o.attachments = v,
            ))
            .field(
                FieldDescriptor::reference(
                    "audit_token",
                    |o: &Order| o.audit_token.clone(),
                    |o, v| o.audit_token = v,
                )
                .one_to_one()
                .ignore(IgnoreRule::null_on_clone()),
            )
            .field(
                FieldDescriptor::reference(
                    "warehouse",
                    |o: &Order| o.warehouse.clone(),
                    |o, v| o.warehouse = v,
                )
                .one_to_one()
                .ignore(IgnoreRule::keep_original()),
            ),
    );

    registry.register(
        NodeSchema::of::<LineItem>("LineItem")
            .field(FieldDescriptor::id("id", |i: &LineItem| i.id, |i, v| i.id = v))
            .field(FieldDescriptor::value(
                "sku",
                |i: &LineItem| i.sku.clone(),
                |i, v| i.sku = v,
            ))
            .field(FieldDescriptor::value(
                "quantity",
                |i: &LineItem| i.quantity,
                |i, v| i.quantity = v,
            ))
            .field(
                FieldDescriptor::reference(
                    "order",
                    |i: &LineItem| i.order.clone(),
                    |i, v| i.order = v,
                )
                .many_to_one(),
            )
            .field(
                FieldDescriptor::reference(
                    "product",
                    |i: &LineItem| i.product.clone(),
                    |i, v| i.product = v,
                )
                .many_to_one()
                .force_clone(),
            ),
    );

    registry.register(
        NodeSchema::of::<Invoice>("Invoice")
            .field(FieldDescriptor::id("id", |i: &Invoice| i.id, |i, v| i.id = v))
            .field(FieldDescriptor::value(
                "number",
                |i: &Invoice| i.number.clone(),
                |i, v| i.number = v,
            ))
            .field(
                FieldDescriptor::reference(
                    "order",
                    |i: &Invoice| i.order.clone(),
                    |i, v| i.order = v,
                )
                .one_to_one(),
            ),
    );

    registry.register(
        NodeSchema::of::<Customer>("Customer")
            .field(FieldDescriptor::id("id", |c: &Customer| c.id, |c, v| c.id = v))
            .field(FieldDescriptor::value(
                "name",
                |c: &Customer| c.name.clone(),
                |c, v| c.name = v,
            ))
            .field(
                FieldDescriptor::unique_set(
                    "segments",
                    |c: &Customer| c.segments.clone(),
                    |c, v| c.segments = v,
                )
                .one_to_many(),
            ),
    );

    registry.register(
        NodeSchema::of::<Segment>("Segment")
            .field(FieldDescriptor::id("id", |s: &Segment| s.id, |s, v| s.id = v))
            .field(FieldDescriptor::value(
                "label",
                |s: &Segment| s.label.clone(),
                |s, v| s.label = v,
            )),
    );

    registry.register(
        NodeSchema::of::<Product>("Product")
            .field(FieldDescriptor::id("id", |p: &Product| p.id, |p, v| p.id = v))
            .field(FieldDescriptor::value(
                "name",
                |p: &Product| p.name.clone(),
                |p, v| p.name = v,
            )),
    );

    registry.register(
        NodeSchema::of::<Attachment>("Attachment")
            .field(FieldDescriptor::id("id", |a: &Attachment| a.id, |a, v| a.id = v))
            .field(FieldDescriptor::value(
                "file_name",
                |a: &Attachment| a.file_name.clone(),
                |a, v| a.file_name = v,
            )),
    );

    registry.register(NodeSchema::of::<AuditToken>("AuditToken").field(
        FieldDescriptor::value(
            "value",
            |t: &AuditToken| t.value.clone(),
            |t, v| t.value = v,
        ),
    ));

    registry.register(
        NodeSchema::of::<Warehouse>("Warehouse")
            .field(FieldDescriptor::id("id", |w: &Warehouse| w.id, |w, v| w.id = v))
            .field(FieldDescriptor::value(
                "code",
                |w: &Warehouse| w.code.clone(),
                |w, v| w.code = v,
            )),
    );

    registry.register(
        NodeSchema::of::<Category>("Category")
            .field(FieldDescriptor::id("id", |c: &Category| c.id, |c, v| c.id = v))
            .field(FieldDescriptor::value(
                "name",
                |c: &Category| c.name.clone(),
                |c, v| c.name = v,
            ))
            .field(
                FieldDescriptor::reference(
                    "parent",
                    |c: &Category| c.parent.clone(),
                    |c, v| c.parent = v,
                )
                .one_to_one(),
            ),
    );

    registry.register(
        NodeSchema::of::<Batch>("Batch")
            .field(FieldDescriptor::id("id", |b: &Batch| b.id, |b, v| b.id = v))
            .field(
                FieldDescriptor::sequence_of_refs(
                    "entries",
                    |b: &Batch| b.entries.clone(),
                    |b, v| b.entries = v,
                )
                .one_to_many(),
            ),
    );

    registry
}

/// The worked end-to-end graph: an order with two line items whose `order`
/// fields point back at it, a many-to-one customer and a one-to-one
/// invoice, both line items sharing one product.
pub struct OrderGraph {
    pub order: Shared<Order>,
    pub items: Vec<Shared<LineItem>>,
    pub customer: Shared<Customer>,
    pub invoice: Shared<Invoice>,
    pub product: Shared<Product>,
}

pub fn order_graph() -> OrderGraph {
    let customer = shared(Customer {
        id: Some(Uuid::new_v4()),
        name: "ACME Corp".into(),
        segments: NodeSet::new(),
    });
    let product = shared(Product {
        id: Some(Uuid::new_v4()),
        name: "Widget".into(),
    });
    let invoice = shared(Invoice {
        id: Some(Uuid::new_v4()),
        number: "INV-0042".into(),
        order: None,
    });
    let order = shared(Order {
        id: Some(Uuid::new_v4()),
        total_cents: 10_000,
        created_at: 1_700_000_000,
        tags: vec!["priority".into(), "export".into()],
        customer: Some(Rc::clone(&customer)),
        invoice: Some(Rc::clone(&invoice)),
        ..Order::default()
    });
    invoice.borrow_mut().order = Some(Rc::clone(&order));

    let items: Vec<Shared<LineItem>> = (1..=2)
        .map(|n| {
            shared(LineItem {
                id: Some(Uuid::new_v4()),
                sku: format!("SKU-{n}"),
                quantity: n,
                order: Some(Rc::clone(&order)),
                product: Some(Rc::clone(&product)),
            })
        })
        .collect();
    order.borrow_mut().items = items.clone();

    OrderGraph {
        order,
        items,
        customer,
        invoice,
        product,
    }
}
