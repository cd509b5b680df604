use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::users::dtos::{
    CreateUserDto, DeleteUserResponseDto, UpdateUserRoleDto, UserListResponseDto,
    UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta};

/// List users with report counts and role statistics (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users retrieved", body = ApiResponse<UserListResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserListResponseDto>>> {
    let users = service.list_with_counts().await?;
    let stats = service.role_stats().await?;
    let total = stats.total;

    let dto = UserListResponseDto {
        users: users.into_iter().map(Into::into).collect(),
        stats,
    };

    Ok(Json(ApiResponse::success(
        Some(dto),
        None,
        Some(Meta { total }),
    )))
}

/// Create an account with an explicit role (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Name already taken")
    ),
    tag = "users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create_user(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user.into()), None, None)),
    ))
}

/// Change a user's role (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRoleDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Cannot demote yourself"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateUserRoleDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.update_role(&admin, id, dto.role).await?;
    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some("Role updated".to_string()),
        None,
    )))
}

/// Delete a user, their reports and their photos (admin only)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeleteUserResponseDto>),
        (status = 400, description = "Cannot delete yourself"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteUserResponseDto>>> {
    let result = service.delete_user(&admin, id).await?;
    let message = format!("User '{}' deleted", result.name);
    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    use crate::core::database::test_pool;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::models::Role;
    use crate::features::users::routes::routes;
    use crate::features::users::services::UserService;
    use crate::modules::storage::PhotoStore;
    use crate::shared::test_helpers::{admin_user, test_user, with_user};

    async fn server(user: AuthenticatedUser) -> (TestServer, tempfile::TempDir) {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let photos = Arc::new(PhotoStore::new(tmp.path().join("uploads")));
        let service = Arc::new(UserService::new(pool, photos));
        (TestServer::new(with_user(routes(service), user)).unwrap(), tmp)
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        for role in [Role::Reporter, Role::Editor] {
            let (server, _tmp) = server(test_user(2, "Taro", role)).await;

            server
                .get("/api/users")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .post("/api/users")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .put("/api/users/3/role")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .delete("/api/users/3")
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn test_admin_lists_users() {
        let (server, _tmp) = server(admin_user()).await;
        server.get("/api/users").await.assert_status_ok();
    }
}
