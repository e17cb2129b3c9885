use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tracing::warn;

use storeadmin_core::{CategoryId, Patch};
use storeadmin_products::{CategoryFilter, CategoryPatch, NewCategory};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

const CREATE_FAILED: &str = "Error handling request";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .put(update_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageQuery>,
    Query(filter): Query<CategoryFilter>,
) -> axum::response::Response {
    match services.categories.list(&filter, page.pagination()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewCategory>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
    };
    let category = match body.into_category(CategoryId::new(), Utc::now()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "category rejected");
            return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
        }
    };
    if let Err(e) = services.categories.insert(&category).await {
        warn!(error = %e, "category insert failed");
        return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
    }
    (StatusCode::CREATED, Json(category)).into_response()
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.categories.find_or_fail(id).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<CategoryPatch>,
) -> axum::response::Response {
    let id: CategoryId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let mut category = match services.categories.find_or_fail(id).await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = patch.validate() {
        return errors::domain_error_to_response(e);
    }
    if patch.is_empty() {
        return (StatusCode::OK, Json(category)).into_response();
    }
    patch.apply_to(&mut category);
    category.updated_at = Utc::now();

    match services.categories.update(&category).await {
        Ok(()) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CategoryId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.categories.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "category not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
