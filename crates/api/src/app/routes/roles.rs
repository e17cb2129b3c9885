use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.roles.list().await {
        Ok(roles) => (StatusCode::OK, Json(roles)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
