use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tracing::{error, warn};

use storeadmin_core::{Patch, ProductId};
use storeadmin_infra::StoreError;
use storeadmin_products::{NewProduct, ProductFilter, ProductPatch};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

const CREATE_FAILED: &str = "Error creating product with given data";
const UPDATE_FAILED: &str = "Error updating product with given data";
const DELETE_FAILED: &str = "It was not possible to delete this product, please try again";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageQuery>,
    Query(filter): Query<ProductFilter>,
) -> axum::response::Response {
    match services.products.list(&filter, page.pagination()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
    };
    let product = match body.into_product(ProductId::new(), Utc::now()) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "product rejected");
            return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
        }
    };
    if let Err(e) = services.products.insert(&product).await {
        warn!(error = %e, "product insert failed");
        return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
    }
    (StatusCode::CREATED, Json(product)).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.products.find_or_fail(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductPatch>, JsonRejection>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let mut product = match services.products.find_or_fail(id).await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };
    let patch = match body {
        Ok(Json(patch)) if patch.validate().is_ok() => patch,
        _ => return errors::message(StatusCode::BAD_REQUEST, UPDATE_FAILED),
    };
    if patch.is_empty() {
        return (StatusCode::OK, Json(product)).into_response();
    }
    patch.apply_to(&mut product);
    product.updated_at = Utc::now();

    match services.products.update(&product).await {
        Ok(()) => (StatusCode::OK, Json(product)).into_response(),
        Err(StoreError::NotFound(what)) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        Err(e) => {
            warn!(error = %e, product_id = %id, "product update failed");
            errors::message(StatusCode::BAD_REQUEST, UPDATE_FAILED)
        }
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.products.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => {
            error!(error = %e, product_id = %id, "product delete failed");
            errors::message(StatusCode::INTERNAL_SERVER_ERROR, DELETE_FAILED)
        }
    }
}
