use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::mail::dtos::{ReplyDraftDto, SendReplyDto, SendReplyResponseDto};
use crate::features::mail::services::MailService;
use crate::shared::types::ApiResponse;

/// Pre-filled reply to a report's submitter (admin only)
#[utoipa::path(
    get,
    path = "/api/reports/{id}/email",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Reply draft", body = ApiResponse<ReplyDraftDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Report not found")
    ),
    tag = "mail",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_reply_draft(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<MailService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReplyDraftDto>>> {
    let draft = service.reply_draft(&admin, id).await?;
    Ok(Json(ApiResponse::success(Some(draft), None, None)))
}

/// Send a reply to a report's submitter (admin only)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/email",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = SendReplyDto,
    responses(
        (status = 200, description = "Reply sent", body = ApiResponse<SendReplyResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "A reply was already sent"),
        (status = 502, description = "SMTP delivery failed"),
        (status = 503, description = "Mail is not configured")
    ),
    tag = "mail",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn send_reply(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<MailService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<SendReplyDto>,
) -> Result<Json<ApiResponse<SendReplyResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.send_reply(&admin, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(result),
        Some("Mail sent".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::core::config::{MailConfig, SenderMode};
    use crate::core::database::test_pool;
    use crate::features::mail::routes::routes;
    use crate::features::mail::services::MailService;
    use crate::features::members::services::MemberService;
    use crate::features::reports::services::ReportService;
    use crate::features::users::models::Role;
    use crate::modules::mail::RecordingMailer;
    use crate::modules::storage::PhotoStore;
    use crate::shared::test_helpers::{test_user, with_user};

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let pool = test_pool().await;
        let members = Arc::new(MemberService::new(pool.clone(), PathBuf::from("data")));
        let photos = Arc::new(PhotoStore::new("uploads"));
        let reports = Arc::new(ReportService::new(
            pool.clone(),
            photos,
            members,
            PathBuf::from("data"),
            1,
        ));
        let config = MailConfig {
            smtp_host: "smtp.example.org".to_string(),
            smtp_port: 587,
            smtp_username: Some("relay@example.org".to_string()),
            smtp_password: None,
            default_sender: "association@example.org".to_string(),
            municipal_contact: "office@town.example".to_string(),
            sender_mode: SenderMode::Fixed,
            fallback_domain: "mail.example".to_string(),
        };
        let mailer = Arc::new(RecordingMailer::new());
        let service = Arc::new(MailService::new(pool, mailer.clone(), config, reports));

        for role in [Role::Reporter, Role::Editor] {
            let router = with_user(routes(Arc::clone(&service)), test_user(2, "Taro", role));
            let server = TestServer::new(router).unwrap();

            server
                .get("/api/reports/1/email")
                .await
                .assert_status(StatusCode::FORBIDDEN);
            server
                .post("/api/reports/1/email")
                .await
                .assert_status(StatusCode::FORBIDDEN);
        }
        assert!(mailer.sent().is_empty());
    }
}
