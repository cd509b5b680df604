use crate::features::exports::handlers;
use crate::features::exports::services::ExportService;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Export routes (admin only, enforced per handler)
pub fn routes(service: Arc<ExportService>) -> Router {
    Router::new()
        .route("/api/exports/stats", get(handlers::get_stats))
        .route("/api/exports/reports.csv", get(handlers::export_reports))
        .with_state(service)
}
