use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storeadmin_core::error::require_non_negative;
use storeadmin_core::{
    DiscountId, DomainResult, Entity, Filter, LineItemId, OrderId, ProductId, UserId,
};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Cancelled,
    Shipped,
    Paid,
    Finished,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Paid => "paid",
            OrderStatus::Finished => "finished",
        }
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = storeadmin_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "shipped" => Ok(OrderStatus::Shipped),
            "paid" => Ok(OrderStatus::Paid),
            "finished" => Ok(OrderStatus::Finished),
            other => Err(storeadmin_core::DomainError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// Order header.
///
/// `total` and `qty_items` are persisted but derived; `subtotal` and
/// `discount_total` are never persisted and only carry meaning right after
/// [`crate::recompute`] ran. All money is in smallest currency unit (e.g., cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub total: i64,
    pub qty_items: i64,
    #[serde(default)]
    pub subtotal: i64,
    #[serde(default)]
    pub discount_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// A fresh order with no children (all derived fields zero).
    pub fn new(id: OrderId, user_id: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            status: OrderStatus::Pending,
            total: 0,
            qty_items: 0,
            subtotal: 0,
            discount_total: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign freshly aggregated child sums to the derived fields.
    pub fn apply_sums(&mut self, subtotal: i64, qty_items: i64, discount_total: i64) {
        self.subtotal = subtotal;
        self.qty_items = qty_items;
        self.discount_total = discount_total;
        self.total = subtotal - discount_total;
    }
}

impl Entity for Order {
    type Id = OrderId;
    const NAME: &'static str = "order";

    fn id(&self) -> OrderId {
        self.id
    }
}

/// One product entry within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub subtotal: i64,
}

/// One deduction applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: DiscountId,
    pub order_id: OrderId,
    pub discount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: i64,
    pub subtotal: i64,
}

impl NewLineItem {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_negative("quantity", self.quantity)?;
        require_non_negative("subtotal", self.subtotal)
    }

    pub fn into_line_item(self, id: LineItemId, order_id: OrderId) -> DomainResult<LineItem> {
        self.validate()?;
        Ok(LineItem {
            id,
            order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            subtotal: self.subtotal,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDiscount {
    pub discount: i64,
}

impl NewDiscount {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_negative("discount", self.discount)
    }

    pub fn into_discount(self, id: DiscountId, order_id: OrderId) -> DomainResult<Discount> {
        self.validate()?;
        Ok(Discount {
            id,
            order_id,
            discount: self.discount,
        })
    }
}

/// Payload for creating an order together with its initial children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<NewLineItem>,
    #[serde(default)]
    pub discounts: Vec<NewDiscount>,
}

impl NewOrder {
    pub fn validate(&self) -> DomainResult<()> {
        self.items.iter().try_for_each(NewLineItem::validate)?;
        self.discounts.iter().try_for_each(NewDiscount::validate)
    }
}

/// List filter: optional exact match on status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

impl Filter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_order_starts_at_zero() {
        let order = Order::new(OrderId::new(), None, Utc::now());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!((order.total, order.qty_items), (0, 0));
        assert_eq!((order.subtotal, order.discount_total), (0, 0));
    }

    #[test]
    fn total_is_not_floored_at_zero() {
        let mut order = Order::new(OrderId::new(), None, Utc::now());
        order.apply_sums(5, 1, 8);
        assert_eq!(order.total, -3);
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            OrderStatus::Shipped,
            OrderStatus::Paid,
            OrderStatus::Finished,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_filter_matches_exactly() {
        let order = Order::new(OrderId::new(), None, Utc::now());
        assert!(OrderFilter::default().matches(&order));
        assert!(OrderFilter { status: Some(OrderStatus::Pending) }.matches(&order));
        assert!(!OrderFilter { status: Some(OrderStatus::Paid) }.matches(&order));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let item = NewLineItem {
            product_id: ProductId::new(),
            quantity: -1,
            subtotal: 10,
        };
        assert!(item.into_line_item(LineItemId::new(), OrderId::new()).is_err());
    }

    #[test]
    fn new_order_validates_every_child() {
        let order = NewOrder {
            user_id: None,
            items: vec![],
            discounts: vec![NewDiscount { discount: -4 }],
        };
        assert!(order.validate().is_err());
    }
}
