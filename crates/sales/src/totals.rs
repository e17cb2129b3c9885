//! Derived order totals.
//!
//! An order's `subtotal`, `qty_items`, `discount_total` and `total` are folds over
//! its current line items and discounts. Callers run [`recompute`] right before an
//! order is serialized or persisted, and [`recompute_all`] before a listed page of
//! orders is serialized.
//!
//! No lock or transaction is taken around the read-then-assign sequence: a child
//! row written concurrently may or may not be reflected. Callers that need a
//! consistent snapshot must wrap the call in their own transaction.

use async_trait::async_trait;
use futures::future::join_all;

use storeadmin_core::OrderId;

use crate::order::Order;

/// Summable columns of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineItemField {
    Subtotal,
    Quantity,
}

impl LineItemField {
    pub fn column(&self) -> &'static str {
        match self {
            LineItemField::Subtotal => "subtotal",
            LineItemField::Quantity => "quantity",
        }
    }
}

/// Summable columns of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountField {
    Discount,
}

impl DiscountField {
    pub fn column(&self) -> &'static str {
        match self {
            DiscountField::Discount => "discount",
        }
    }
}

/// Aggregate-sum access to the children of an order.
///
/// Each method returns the sum of `field` over every child row of `order_id`,
/// or 0 when the order has no such children.
#[async_trait]
pub trait OrderChildren: Send + Sync {
    type Error: Send;

    async fn sum_line_items(
        &self,
        order_id: OrderId,
        field: LineItemField,
    ) -> Result<i64, Self::Error>;

    async fn sum_discounts(
        &self,
        order_id: OrderId,
        field: DiscountField,
    ) -> Result<i64, Self::Error>;
}

/// Recompute one order's derived fields from its current children.
///
/// The three sums are independent reads and are awaited concurrently. Only the
/// in-memory `order` is mutated; persisting `total`/`qty_items` is the caller's job.
/// Query failures are returned unchanged and leave `order` untouched.
pub async fn recompute<C>(children: &C, order: &mut Order) -> Result<(), C::Error>
where
    C: OrderChildren + ?Sized,
{
    let id = order.id;
    let (subtotal, qty_items, discount_total) = futures::try_join!(
        children.sum_line_items(id, LineItemField::Subtotal),
        children.sum_line_items(id, LineItemField::Quantity),
        children.sum_discounts(id, DiscountField::Discount),
    )?;
    order.apply_sums(subtotal, qty_items, discount_total);
    Ok(())
}

/// Recompute every order in `orders` concurrently.
///
/// Every per-order recomputation runs to completion, including after another one
/// has failed. The first error (in input order) is then returned; orders whose
/// recomputation succeeded keep their new values either way.
pub async fn recompute_all<C>(children: &C, orders: &mut [Order]) -> Result<(), C::Error>
where
    C: OrderChildren + ?Sized,
{
    join_all(orders.iter_mut().map(|order| recompute(children, order)))
        .await
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use chrono::Utc;
    use futures::executor::block_on;
    use proptest::prelude::*;

    use storeadmin_core::{DiscountId, LineItemId, ProductId};

    use super::*;
    use crate::order::{Discount, LineItem};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct QueryFailed(OrderId);

    /// Children held in memory, with per-order failure injection and a call log.
    #[derive(Default)]
    struct FakeChildren {
        items: HashMap<OrderId, Vec<LineItem>>,
        discounts: HashMap<OrderId, Vec<Discount>>,
        failing: HashSet<OrderId>,
        calls: Mutex<Vec<OrderId>>,
    }

    impl FakeChildren {
        fn add_item(&mut self, order_id: OrderId, subtotal: i64, quantity: i64) {
            self.items.entry(order_id).or_default().push(LineItem {
                id: LineItemId::new(),
                order_id,
                product_id: ProductId::new(),
                quantity,
                subtotal,
            });
        }

        fn add_discount(&mut self, order_id: OrderId, discount: i64) {
            self.discounts.entry(order_id).or_default().push(Discount {
                id: DiscountId::new(),
                order_id,
                discount,
            });
        }

        fn check(&self, order_id: OrderId) -> Result<(), QueryFailed> {
            self.calls.lock().unwrap().push(order_id);
            if self.failing.contains(&order_id) {
                Err(QueryFailed(order_id))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl OrderChildren for FakeChildren {
        type Error = QueryFailed;

        async fn sum_line_items(
            &self,
            order_id: OrderId,
            field: LineItemField,
        ) -> Result<i64, QueryFailed> {
            self.check(order_id)?;
            Ok(self
                .items
                .get(&order_id)
                .map(|items| {
                    items
                        .iter()
                        .map(|i| match field {
                            LineItemField::Subtotal => i.subtotal,
                            LineItemField::Quantity => i.quantity,
                        })
                        .sum()
                })
                .unwrap_or(0))
        }

        async fn sum_discounts(
            &self,
            order_id: OrderId,
            _field: DiscountField,
        ) -> Result<i64, QueryFailed> {
            self.check(order_id)?;
            Ok(self
                .discounts
                .get(&order_id)
                .map(|ds| ds.iter().map(|d| d.discount).sum())
                .unwrap_or(0))
        }
    }

    fn order() -> Order {
        Order::new(OrderId::new(), None, Utc::now())
    }

    #[test]
    fn order_without_children_is_all_zero() {
        let children = FakeChildren::default();
        let mut o = order();
        o.total = 99;
        o.qty_items = 7;
        block_on(recompute(&children, &mut o)).unwrap();
        assert_eq!((o.subtotal, o.qty_items, o.discount_total, o.total), (0, 0, 0, 0));
    }

    #[test]
    fn sums_items_and_discounts() {
        let mut o = order();
        let mut children = FakeChildren::default();
        children.add_item(o.id, 10, 2);
        children.add_item(o.id, 5, 1);
        children.add_discount(o.id, 3);

        block_on(recompute(&children, &mut o)).unwrap();

        assert_eq!(o.subtotal, 15);
        assert_eq!(o.qty_items, 3);
        assert_eq!(o.discount_total, 3);
        assert_eq!(o.total, 12);
    }

    #[test]
    fn discounts_larger_than_subtotal_give_negative_total() {
        let mut o = order();
        let mut children = FakeChildren::default();
        children.add_item(o.id, 4, 1);
        children.add_discount(o.id, 10);

        block_on(recompute(&children, &mut o)).unwrap();
        assert_eq!(o.total, -6);
    }

    #[test]
    fn only_the_orders_own_children_are_counted() {
        let mut mine = order();
        let other = order();
        let mut children = FakeChildren::default();
        children.add_item(mine.id, 7, 1);
        children.add_item(other.id, 1000, 50);
        children.add_discount(other.id, 1);

        block_on(recompute(&children, &mut mine)).unwrap();
        assert_eq!((mine.subtotal, mine.qty_items, mine.total), (7, 1, 7));
    }

    #[test]
    fn failure_is_propagated_and_leaves_order_untouched() {
        let mut o = order();
        let mut children = FakeChildren::default();
        children.add_item(o.id, 10, 1);
        children.failing.insert(o.id);
        let before = o.clone();

        let err = block_on(recompute(&children, &mut o)).unwrap_err();
        assert_eq!(err, QueryFailed(o.id));
        assert_eq!(o, before);
    }

    #[test]
    fn recompute_all_on_empty_slice_succeeds() {
        let children = FakeChildren::default();
        let mut orders: Vec<Order> = Vec::new();
        block_on(recompute_all(&children, &mut orders)).unwrap();
        assert!(children.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn recompute_all_updates_every_order() {
        let mut orders = vec![order(), order()];
        let mut children = FakeChildren::default();
        children.add_item(orders[0].id, 10, 1);
        children.add_item(orders[1].id, 20, 2);
        children.add_discount(orders[1].id, 5);

        block_on(recompute_all(&children, &mut orders)).unwrap();
        assert_eq!(orders[0].total, 10);
        assert_eq!(orders[1].total, 15);
        assert_eq!(orders[1].qty_items, 2);
    }

    #[test]
    fn recompute_all_failure_still_updates_the_other_orders() {
        let mut orders = vec![order(), order(), order()];
        let mut children = FakeChildren::default();
        for (n, o) in orders.iter().enumerate() {
            children.add_item(o.id, 10 * (n as i64 + 1), 1);
        }
        children.failing.insert(orders[1].id);
        let failing_before = orders[1].clone();

        let err = block_on(recompute_all(&children, &mut orders)).unwrap_err();

        assert_eq!(err, QueryFailed(orders[1].id));
        // The failure does not stop the remaining recomputations.
        assert_eq!(orders[0].total, 10);
        assert_eq!(orders[2].total, 30);
        assert_eq!(orders[1], failing_before);
        let calls = children.calls.lock().unwrap();
        assert!(calls.contains(&orders[0].id));
        assert!(calls.contains(&orders[2].id));
    }

    #[test]
    fn recompute_all_reports_first_failure_in_input_order() {
        let mut orders = vec![order(), order(), order()];
        let mut children = FakeChildren::default();
        children.failing.insert(orders[2].id);
        children.failing.insert(orders[1].id);

        let err = block_on(recompute_all(&children, &mut orders)).unwrap_err();
        assert_eq!(err, QueryFailed(orders[1].id));
    }

    proptest! {
        /// Property: total = subtotal - discount_total, and recomputing twice is stable.
        #[test]
        fn total_is_subtotal_minus_discounts(
            items in proptest::collection::vec((0i64..100_000, 0i64..1_000), 0..20),
            discounts in proptest::collection::vec(0i64..200_000, 0..5),
        ) {
            let mut o = order();
            let mut children = FakeChildren::default();
            for (subtotal, quantity) in &items {
                children.add_item(o.id, *subtotal, *quantity);
            }
            for d in &discounts {
                children.add_discount(o.id, *d);
            }

            block_on(recompute(&children, &mut o)).unwrap();
            let first = o.clone();
            block_on(recompute(&children, &mut o)).unwrap();

            prop_assert_eq!(o.total, o.subtotal - o.discount_total);
            prop_assert_eq!(o.subtotal, items.iter().map(|(s, _)| s).sum::<i64>());
            prop_assert_eq!(o.qty_items, items.iter().map(|(_, q)| q).sum::<i64>());
            prop_assert_eq!(o.discount_total, discounts.iter().sum::<i64>());
            prop_assert_eq!(first, o);
        }
    }
}
