use axum::{routing::get, Router};

pub mod categories;
pub mod orders;
pub mod products;
pub mod roles;
pub mod system;
pub mod users;

/// Router for every resource endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/roles", get(roles::list_roles))
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/users", users::router())
        .nest("/orders", orders::router())
}
