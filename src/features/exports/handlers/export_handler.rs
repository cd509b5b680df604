use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::auth::guards::RequireAdmin;
use crate::features::exports::dtos::{ExportQuery, ExportStatsDto};
use crate::features::exports::services::ExportService;
use crate::shared::{time, types::ApiResponse};

/// Report totals for the export page (admin only)
#[utoipa::path(
    get,
    path = "/api/exports/stats",
    responses(
        (status = 200, description = "Report statistics", body = ApiResponse<ExportStatsDto>),
        (status = 403, description = "Admin access required")
    ),
    tag = "exports",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ExportService>>,
) -> Result<Json<ApiResponse<ExportStatsDto>>> {
    let stats = service.stats(time::today()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Download reports as CSV (admin only)
///
/// UTF-8 with a byte order mark so spreadsheet software detects the encoding.
#[utoipa::path(
    get,
    path = "/api/exports/reports.csv",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid date"),
        (status = 403, description = "Admin access required")
    ),
    tag = "exports",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn export_reports(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ExportService>>,
    AppQuery(query): AppQuery<ExportQuery>,
) -> Result<Response> {
    let export = service.export_csv(&query, time::today()).await?;

    tracing::info!(
        "{} downloaded {} ({} rows)",
        admin.name,
        export.file_name,
        export.row_count
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", export.file_name),
            ),
        ],
        export.body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    use crate::core::database::test_pool;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::exports::routes::routes;
    use crate::features::exports::services::ExportService;
    use crate::features::members::services::MemberService;
    use crate::features::users::models::Role;
    use crate::modules::storage::PhotoStore;
    use crate::shared::test_helpers::{admin_user, test_user, with_user};

    async fn server(user: Option<AuthenticatedUser>) -> (TestServer, tempfile::TempDir) {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let photos = Arc::new(PhotoStore::new(tmp.path().join("uploads")));
        let members = Arc::new(MemberService::new(pool.clone(), tmp.path().to_path_buf()));
        let service = Arc::new(ExportService::new(pool, photos, members));

        let router = match user {
            Some(user) => with_user(routes(service), user),
            None => routes(service),
        };
        (TestServer::new(router).unwrap(), tmp)
    }

    #[tokio::test]
    async fn test_csv_download_headers() {
        let (server, _tmp) = server(Some(admin_user())).await;

        let response = server
            .get("/api/exports/reports.csv")
            .add_query_param("start_date", "2024-05-01")
            .add_query_param("end_date", "2024-05-31")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.header("content-disposition").to_str().unwrap(),
            "attachment; filename=reports_20240501_20240531.csv"
        );
        assert!(response.as_bytes().starts_with(b"\xEF\xBB\xBFReport number,"));
    }

    #[tokio::test]
    async fn test_bad_query_is_bad_request() {
        let (server, _tmp) = server(Some(admin_user())).await;

        let response = server
            .get("/api/exports/reports.csv")
            .add_query_param("include_photos", "maybe")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        for role in [Role::Reporter, Role::Editor] {
            let (server, _tmp) = server(Some(test_user(2, "Taro", role))).await;

            server
                .get("/api/exports/reports.csv")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .get("/api/exports/stats")
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_without_session_unauthorized() {
        let (server, _tmp) = server(None).await;

        server
            .get("/api/exports/stats")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
