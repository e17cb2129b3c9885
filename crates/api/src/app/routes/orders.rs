//! Order endpoints.
//!
//! Derived totals are refreshed explicitly: every handler runs `recompute` (or
//! `recompute_all` for a page) right before serializing, and writes `total` /
//! `qty_items` back after children change.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

use storeadmin_core::{DiscountId, LineItemId, OrderId};
use storeadmin_infra::{OrderStore, StoreResult};
use storeadmin_sales::{recompute, recompute_all, NewDiscount, NewLineItem, NewOrder, Order, OrderFilter};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/items", post(add_line_item))
        .route("/:id/discounts", post(add_discount))
}

/// Recompute from current children and persist the derived fields.
async fn save_totals(orders: &dyn OrderStore, order: &mut Order) -> StoreResult<()> {
    recompute(orders, order).await?;
    order.updated_at = Utc::now();
    orders.update(order).await
}

async fn details(orders: &dyn OrderStore, order: Order) -> StoreResult<dto::OrderDetails> {
    let (items, discounts) =
        tokio::try_join!(orders.line_items(order.id), orders.discounts(order.id))?;
    Ok(dto::OrderDetails {
        order,
        items,
        discounts,
    })
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageQuery>,
    Query(filter): Query<OrderFilter>,
) -> axum::response::Response {
    let mut page = match services.orders.list(&filter, page.pagination()).await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = recompute_all(services.orders.as_ref(), &mut page.data).await {
        return errors::store_error_to_response(e);
    }
    (StatusCode::OK, Json(page)).into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let orders = services.orders.as_ref();
    let mut order = match orders.find_or_fail(id).await {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = recompute(orders, &mut order).await {
        return errors::store_error_to_response(e);
    }
    match details(orders, order).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewOrder>,
) -> axum::response::Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }
    if let Some(user_id) = body.user_id {
        match services.users.find(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("unknown user {user_id}"),
                );
            }
            Err(e) => return errors::store_error_to_response(e),
        }
    }

    let orders = services.orders.as_ref();
    let mut order = Order::new(OrderId::new(), body.user_id, Utc::now());
    if let Err(e) = orders.insert(&order).await {
        return errors::store_error_to_response(e);
    }

    for item in body.items {
        let insert = match item.into_line_item(LineItemId::new(), order.id) {
            Ok(item) => orders.insert_line_item(&item).await,
            Err(e) => return errors::domain_error_to_response(e),
        };
        if let Err(e) = insert {
            return errors::store_error_to_response(e);
        }
    }
    for discount in body.discounts {
        let insert = match discount.into_discount(DiscountId::new(), order.id) {
            Ok(d) => orders.insert_discount(&d).await,
            Err(e) => return errors::domain_error_to_response(e),
        };
        if let Err(e) = insert {
            return errors::store_error_to_response(e);
        }
    }

    if let Err(e) = save_totals(orders, &mut order).await {
        return errors::store_error_to_response(e);
    }
    info!(order_id = %order.id, total = order.total, qty_items = order.qty_items, "order created");

    match details(orders, order).await {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn add_line_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<NewLineItem>,
) -> axum::response::Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let orders = services.orders.as_ref();
    let mut order = match orders.find_or_fail(id).await {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };
    let item = match body.into_line_item(LineItemId::new(), id) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = orders.insert_line_item(&item).await {
        return errors::store_error_to_response(e);
    }
    if let Err(e) = save_totals(orders, &mut order).await {
        return errors::store_error_to_response(e);
    }
    match details(orders, order).await {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn add_discount(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<NewDiscount>,
) -> axum::response::Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let orders = services.orders.as_ref();
    let mut order = match orders.find_or_fail(id).await {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };
    let discount = match body.into_discount(DiscountId::new(), id) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = orders.insert_discount(&discount).await {
        return errors::store_error_to_response(e);
    }
    if let Err(e) = save_totals(orders, &mut order).await {
        return errors::store_error_to_response(e);
    }
    match details(orders, order).await {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.orders.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
