use crate::features::mail::handlers;
use crate::features::mail::services::MailService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Reply routes (admin only, enforced per handler)
pub fn routes(service: Arc<MailService>) -> Router {
    Router::new()
        .route(
            "/api/reports/{id}/email",
            get(handlers::get_reply_draft).post(handlers::send_reply),
        )
        .with_state(service)
}
