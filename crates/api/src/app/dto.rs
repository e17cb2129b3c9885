use std::str::FromStr;

use serde::{Deserialize, Serialize};

use storeadmin_core::{DomainError, Pagination};
use storeadmin_sales::{Discount, LineItem, Order};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `?page=&limit=` on every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}

// -------------------------
// Response DTOs
// -------------------------

/// An order together with its children, as returned by the order endpoints.
#[derive(Debug, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<LineItem>,
    pub discounts: Vec<Discount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeadmin_core::OrderId;

    #[test]
    fn page_query_defaults() {
        let p = PageQuery::default().pagination();
        assert_eq!((p.page, p.limit), (1, 20));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let res = parse_id::<OrderId>("not-a-uuid").unwrap_err();
        assert_eq!(res.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn order_details_flatten_the_order() {
        let order = Order::new(OrderId::new(), None, chrono::Utc::now());
        let json = serde_json::to_value(OrderDetails {
            order,
            items: vec![],
            discounts: vec![],
        })
        .unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["status"], "pending");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
