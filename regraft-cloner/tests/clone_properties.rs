//! Property-based tests for clone correctness over generated graphs:
//! the single-copy guarantee, termination on cycles of any length, and
//! originals staying untouched.

mod common;

use common::*;
use proptest::prelude::*;
use regraft_cloner::GraphCloner;
use std::rc::Rc;
use uuid::Uuid;

proptest! {
    /// Fan-out graphs: every child copy points at the one owner copy, the
    /// shared grandchild becomes exactly one copy, and the original graph
    /// is left exactly as built.
    #[test]
    fn fan_out_preserves_shape_and_identity(count in 0usize..24) {
        let registry = registry();
        let cloner = GraphCloner::new(&registry);
        let product = shared(Product {
            id: Some(Uuid::new_v4()),
            name: "shared".into(),
        });
        let order = shared(Order::default());
        let items: Vec<Shared<LineItem>> = (0..count)
            .map(|n| shared(LineItem {
                id: Some(Uuid::new_v4()),
                sku: format!("SKU-{n}"),
                order: Some(Rc::clone(&order)),
                product: Some(Rc::clone(&product)),
                ..LineItem::default()
            }))
            .collect();
        order.borrow_mut().items = items.clone();

        let copy = cloner.clone_node(&order).unwrap();

        prop_assert_eq!(copy.borrow().items.len(), count);
        let mut product_copies = Vec::new();
        for (index, item_copy) in copy.borrow().items.iter().enumerate() {
            prop_assert!(!Rc::ptr_eq(item_copy, &items[index]));
            let item = item_copy.borrow();
            prop_assert!(item.id.is_none());
            prop_assert!(Rc::ptr_eq(item.order.as_ref().unwrap(), &copy));
            product_copies.push(item.product.clone().unwrap());
        }
        for product_copy in &product_copies {
            prop_assert!(!Rc::ptr_eq(product_copy, &product));
            prop_assert!(
                Rc::ptr_eq(product_copy, &product_copies[0]),
                "a node reachable many times must have a single copy"
            );
        }

        prop_assert_eq!(order.borrow().items.len(), count);
        for item in &items {
            prop_assert!(Rc::ptr_eq(item.borrow().order.as_ref().unwrap(), &order));
            prop_assert!(item.borrow().id.is_some());
        }
    }

    /// Cyclic chains: cloning terminates and the copy is a cycle of the
    /// same length made of fresh nodes.
    #[test]
    fn cyclic_chain_clones_into_a_cycle_of_the_same_length(len in 1usize..32) {
        let registry = registry();
        let cloner = GraphCloner::new(&registry);
        let nodes: Vec<Shared<Category>> = (0..len)
            .map(|n| shared(Category {
                name: format!("c{n}"),
                ..Category::default()
            }))
            .collect();
        for index in 0..len {
            nodes[index].borrow_mut().parent = Some(Rc::clone(&nodes[(index + 1) % len]));
        }

        let copy = cloner.clone_node(&nodes[0]).unwrap();

        let mut cursor = Rc::clone(&copy);
        for step in 0..len {
            prop_assert!(!Rc::ptr_eq(&cursor, &nodes[step]));
            prop_assert_eq!(cursor.borrow().name.clone(), format!("c{step}"));
            let next = cursor.borrow().parent.clone().unwrap();
            cursor = next;
        }
        prop_assert!(Rc::ptr_eq(&cursor, &copy), "cycle must close after {} steps", len);
    }
}
