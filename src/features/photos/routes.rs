use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::features::photos::handlers;
use crate::features::photos::services::PhotoCleanupService;

/// Retention routes (admin only, enforced per handler)
pub fn routes(service: Arc<PhotoCleanupService>) -> Router {
    Router::new()
        .route(
            "/api/photos/cleanup",
            get(handlers::get_cleanup_overview).post(handlers::execute_cleanup),
        )
        .with_state(service)
}

/// Uploaded photos under `/uploads/{report_number}/{file}`, for any signed-in user
pub fn file_routes(upload_dir: &Path) -> Router {
    Router::new().nest_service("/uploads", ServeDir::new(upload_dir))
}
