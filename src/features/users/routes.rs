use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

/// User management routes (admin only, enforced per handler)
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/{id}/role", put(handlers::update_user_role))
        .route("/api/users/{id}", delete(handlers::delete_user))
        .with_state(service)
}
