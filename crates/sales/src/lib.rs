//! Orders domain module.
//!
//! Order records and their children, plus the routine that derives an order's
//! summary fields (subtotal, quantity, discounts, total) from its current children.
//! Storage is reached only through the [`OrderChildren`] capability passed in by
//! the caller.

pub mod order;
pub mod totals;

pub use order::{
    Discount, LineItem, NewDiscount, NewLineItem, NewOrder, Order, OrderFilter, OrderStatus,
};
pub use totals::{DiscountField, LineItemField, OrderChildren, recompute, recompute_all};
