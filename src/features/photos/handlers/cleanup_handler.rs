use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::photos::dtos::{CleanupOverviewDto, CleanupResultDto};
use crate::features::photos::services::PhotoCleanupService;
use crate::shared::{time, types::ApiResponse};

/// Retention status and the reports the next sweep will touch (admin only)
#[utoipa::path(
    get,
    path = "/api/photos/cleanup",
    responses(
        (status = 200, description = "Cleanup overview", body = ApiResponse<CleanupOverviewDto>),
        (status = 403, description = "Admin access required")
    ),
    tag = "photos",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_cleanup_overview(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<PhotoCleanupService>>,
) -> Result<Json<ApiResponse<CleanupOverviewDto>>> {
    let overview = service.overview(time::now()).await?;
    Ok(Json(ApiResponse::success(Some(overview), None, None)))
}

/// Run the retention sweep now (admin only)
#[utoipa::path(
    post,
    path = "/api/photos/cleanup",
    responses(
        (status = 200, description = "Sweep finished", body = ApiResponse<CleanupResultDto>),
        (status = 403, description = "Admin access required")
    ),
    tag = "photos",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn execute_cleanup(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<PhotoCleanupService>>,
) -> Result<Json<ApiResponse<CleanupResultDto>>> {
    tracing::info!("Photo cleanup started by {}", admin.name);
    let result = service.execute(time::now()).await?;
    let message = format!(
        "Removed photos of {} reports ({} bytes)",
        result.deleted_count, result.deleted_bytes
    );
    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    use crate::core::config::CleanupConfig;
    use crate::core::database::test_pool;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::photos::routes::routes;
    use crate::features::photos::services::PhotoCleanupService;
    use crate::features::users::models::Role;
    use crate::modules::storage::PhotoStore;
    use crate::shared::test_helpers::{admin_user, test_user, with_user};

    async fn server(user: AuthenticatedUser) -> (TestServer, tempfile::TempDir) {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let photos = Arc::new(PhotoStore::new(tmp.path().join("uploads")));
        let config = CleanupConfig {
            retention_days: 60,
            enabled: true,
            hour: 2,
        };
        let service = Arc::new(PhotoCleanupService::new(pool, photos, config));
        (TestServer::new(with_user(routes(service), user)).unwrap(), tmp)
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        for role in [Role::Reporter, Role::Editor] {
            let (server, _tmp) = server(test_user(2, "Taro", role)).await;

            server
                .get("/api/photos/cleanup")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .post("/api/photos/cleanup")
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_admin_runs_sweep() {
        let (server, _tmp) = server(admin_user()).await;
        server.post("/api/photos/cleanup").await.assert_status_ok();
    }
}
