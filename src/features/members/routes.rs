use crate::features::members::handlers;
use crate::features::members::services::MemberService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Roster routes (editor or admin, enforced per handler)
pub fn routes(service: Arc<MemberService>) -> Router {
    Router::new()
        .route(
            "/api/members",
            get(handlers::list_members).post(handlers::create_member),
        )
        .route("/api/members/import", post(handlers::import_roster))
        .route(
            "/api/members/{id}",
            get(handlers::get_member)
                .put(handlers::update_member)
                .delete(handlers::delete_member),
        )
        .with_state(service)
}
