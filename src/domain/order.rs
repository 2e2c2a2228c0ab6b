//! Order keys: dense `1..=n` per sibling group.

use std::collections::{HashMap, VecDeque};

use tracing::trace;

use crate::domain::arena::Forest;
use crate::domain::entities::CategoryId;

/// Stamp every sibling group with orders `1..=n` in display order.
///
/// Breadth-first: the top-level group first, then each parent's children as
/// an independent group. Orders are only comparable within a group.
/// Idempotent for a given shape.
pub fn assign(forest: &Forest) -> Forest {
    let mut orders: HashMap<CategoryId, u32> = HashMap::with_capacity(forest.len());
    let mut queue: VecDeque<Vec<CategoryId>> = VecDeque::from([forest.roots()]);

    while let Some(group) = queue.pop_front() {
        for (pos, &id) in group.iter().enumerate() {
            orders.insert(id, pos as u32 + 1);
            let children = forest.children_of(id);
            if !children.is_empty() {
                queue.push_back(children);
            }
        }
    }

    trace!(stamped = orders.len(), "assigned orders");
    forest.with_orders(&orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CategoryNode;

    #[test]
    fn given_stale_orders_when_assigning_then_each_group_restarts_at_one() {
        let forest = Forest::from_nodes(&[
            CategoryNode::new(1, "A").with_order(7).with_children(vec![
                CategoryNode::new(2, "A1").with_order(3),
                CategoryNode::new(4, "A2").with_order(3),
            ]),
            CategoryNode::new(3, "B").with_order(2),
        ])
        .unwrap();

        let stamped = assign(&forest);

        let orders: Vec<_> = stamped.iter().map(|v| (v.category.id, v.category.order)).collect();
        assert_eq!(orders, vec![(1, 1), (2, 1), (4, 2), (3, 2)]);
        assert!(stamped.orders_are_dense());
        // input untouched
        assert_eq!(forest.get(1).map(|c| c.order), Some(7));
    }
}
