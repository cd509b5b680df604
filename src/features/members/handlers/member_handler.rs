use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireEditor;
use crate::features::members::dtos::{
    ImportRosterResponseDto, MemberInputDto, MemberResponseDto,
};
use crate::features::members::services::MemberService;
use crate::shared::types::{ApiResponse, Meta};

/// List roster members ordered by name (editor or admin)
#[utoipa::path(
    get,
    path = "/api/members",
    responses(
        (status = 200, description = "Members retrieved", body = ApiResponse<Vec<MemberResponseDto>>),
        (status = 403, description = "Editor access required")
    ),
    tag = "members",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_members(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<MemberService>>,
) -> Result<Json<ApiResponse<Vec<MemberResponseDto>>>> {
    let members: Vec<MemberResponseDto> = service
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = members.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(members),
        None,
        Some(Meta { total }),
    )))
}

/// Get a member by ID (editor or admin)
#[utoipa::path(
    get,
    path = "/api/members/{id}",
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member found", body = ApiResponse<MemberResponseDto>),
        (status = 403, description = "Editor access required"),
        (status = 404, description = "Member not found")
    ),
    tag = "members",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_member(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<MemberService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MemberResponseDto>>> {
    let member = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(member.into()), None, None)))
}

/// Add a member (editor or admin)
#[utoipa::path(
    post,
    path = "/api/members",
    request_body = MemberInputDto,
    responses(
        (status = 201, description = "Member created", body = ApiResponse<MemberResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Editor access required"),
        (status = 409, description = "Member already exists")
    ),
    tag = "members",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_member(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<MemberService>>,
    AppJson(dto): AppJson<MemberInputDto>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = service.create(&dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(member.into()), None, None)),
    ))
}

/// Replace a member's fields (editor or admin)
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    request_body = MemberInputDto,
    responses(
        (status = 200, description = "Member updated", body = ApiResponse<MemberResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Editor access required"),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Name already used by another member")
    ),
    tag = "members",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_member(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<MemberService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<MemberInputDto>,
) -> Result<Json<ApiResponse<MemberResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let member = service.update(id, &dto).await?;
    Ok(Json(ApiResponse::success(Some(member.into()), None, None)))
}

/// Delete a member (editor or admin)
#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    params(
        ("id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Member deleted"),
        (status = 403, description = "Editor access required"),
        (status = 404, description = "Member not found")
    ),
    tag = "members",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_member(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<MemberService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Member deleted".to_string()),
        None,
    )))
}

/// Import member names from a roster CSV (editor or admin)
///
/// Accepts an optional multipart field `file`. Without it the server-side
/// `roster.csv` in the data directory is imported.
#[utoipa::path(
    post,
    path = "/api/members/import",
    request_body(
        content_type = "multipart/form-data",
        description = "Optional `file` field holding a single-column CSV of names"
    ),
    responses(
        (status = 200, description = "Import finished", body = ApiResponse<ImportRosterResponseDto>),
        (status = 400, description = "Invalid CSV"),
        (status = 403, description = "Editor access required"),
        (status = 404, description = "No upload and no server roster file")
    ),
    tag = "members",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn import_roster(
    RequireEditor(user): RequireEditor,
    State(service): State<Arc<MemberService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportRosterResponseDto>>> {
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        // A file input left empty still sends a part with no filename
        if field.file_name().is_none_or(str::is_empty) {
            continue;
        }
        let data = field.bytes().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;
        upload = Some(data.to_vec());
    }

    let result = service.import_roster(upload).await?;
    tracing::info!("Roster imported by {}", user.name);

    let message = format!(
        "Import complete: {} added, {} skipped",
        result.imported, result.skipped
    );
    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    use crate::core::database::test_pool;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::members::routes::routes;
    use crate::features::members::services::MemberService;
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{test_user, with_user};

    async fn server(user: AuthenticatedUser) -> (TestServer, tempfile::TempDir) {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let service = Arc::new(MemberService::new(pool, tmp.path().to_path_buf()));
        (TestServer::new(with_user(routes(service), user)).unwrap(), tmp)
    }

    #[tokio::test]
    async fn test_reporter_forbidden() {
        let (server, _tmp) = server(test_user(2, "Taro", Role::Reporter)).await;

        server
            .get("/api/members")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/api/members/1")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .post("/api/members/import")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete("/api/members/1")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_editor_allowed() {
        let (server, _tmp) = server(test_user(3, "Hanako", Role::Editor)).await;
        server.get("/api/members").await.assert_status_ok();
    }
}
