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

use storeadmin_auth::{NewUser, UserFilter, UserPatch};
use storeadmin_core::{Patch, UserId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

const CREATE_FAILED: &str = "User was not created, please verify data and try again";
const DELETE_FAILED: &str = "Error deleting user, please try again";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:id",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(page): Query<dto::PageQuery>,
    Query(filter): Query<UserFilter>,
) -> axum::response::Response {
    match services.users.list(&filter, page.pagination()).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
    };
    let user = match body.into_user(UserId::new(), Utc::now()) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "user rejected");
            return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
        }
    };
    if let Err(e) = services.users.insert(&user).await {
        warn!(error = %e, "user insert failed");
        return errors::message(StatusCode::BAD_REQUEST, CREATE_FAILED);
    }
    (StatusCode::CREATED, Json(user)).into_response()
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.users.find_or_fail(id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> axum::response::Response {
    let id: UserId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let mut user = match services.users.find_or_fail(id).await {
        Ok(u) => u,
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = patch.validate() {
        return errors::domain_error_to_response(e);
    }
    if patch.is_empty() {
        return (StatusCode::OK, Json(user)).into_response();
    }
    patch.apply_to(&mut user);
    user.updated_at = Utc::now();

    match services.users.update(&user).await {
        Ok(()) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: UserId = match dto::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.users.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => {
            error!(error = %e, user_id = %id, "user delete failed");
            errors::message(StatusCode::INTERNAL_SERVER_ERROR, DELETE_FAILED)
        }
    }
}
