use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::mail::MailService;
use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature
///
/// All routes require the auth middleware applied by the caller.
pub fn routes(
    report_service: Arc<ReportService>,
    mail_service: Arc<MailService>,
    max_upload_bytes: usize,
) -> Router {
    let state = ReportState {
        report_service,
        mail_service,
    };

    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::submit_report),
        )
        .route("/api/reports/form-options", get(handlers::form_options))
        .route("/api/reports/{id}", get(handlers::get_report))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
