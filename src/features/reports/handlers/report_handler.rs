use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::mail::MailService;
use crate::features::reports::dtos::{
    FormOptionsDto, ReportDetailResponseDto, ReportResponseDto, SubmitReportDoc,
    SubmitReportForm, SubmitReportResponseDto,
};
use crate::features::reports::services::ReportService;
use crate::modules::storage::PhotoUpload;
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub mail_service: Arc<MailService>,
}

/// Checkbox-style flag: present and not explicitly false
fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

async fn field_text(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read field '{}': {}", name, e)))
}

/// Split the multipart stream into form fields and photos.
/// Photo parts without a file name (an empty file input) are dropped.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(SubmitReportForm, Vec<PhotoUpload>)> {
    let mut form = SubmitReportForm::default();
    let mut photos = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "photos" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                if file_name.is_empty() {
                    continue;
                }
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read photo '{}': {}", file_name, e))
                })?;
                photos.push(PhotoUpload {
                    file_name,
                    data: data.to_vec(),
                });
            }
            "date" => form.date = field_text(field, &name).await?,
            "start_time" => form.start_time = field_text(field, &name).await?,
            "end_time" => form.end_time = field_text(field, &name).await?,
            "method" => form.method = field_text(field, &name).await?,
            "hunter" => form.hunter = field_text(field, &name).await?,
            "location" => form.location = field_text(field, &name).await?,
            "animal" => form.animal = field_text(field, &name).await?,
            "sex" => form.sex = field_text(field, &name).await?,
            "team_members" => form.team_members.push(field_text(field, &name).await?),
            "tasks" => form.tasks.push(field_text(field, &name).await?),
            "tail_submitted" => {
                let value = field_text(field, &name).await?;
                form.tail_submitted = is_truthy(&value);
            }
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }

    Ok((form, photos))
}

/// Choice lists for the submission form
#[utoipa::path(
    get,
    path = "/api/reports/form-options",
    responses(
        (status = 200, description = "Form choice lists", body = ApiResponse<FormOptionsDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reports",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn form_options(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
) -> Json<ApiResponse<FormOptionsDto>> {
    let options = state.report_service.form_options().await;
    Json(ApiResponse::success(Some(options), None, None))
}

/// Submit an activity report with photos
///
/// The municipal contact is notified by mail; a mail failure does not fail
/// the submission and is reflected in `mail_sent`.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body(
        content = SubmitReportDoc,
        content_type = "multipart/form-data",
        description = "Report fields; `team_members`, `tasks` and `photos` may repeat"
    ),
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<SubmitReportResponseDto>),
        (status = 400, description = "Invalid form or too few photos"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "No report number could be allocated"),
        (status = 413, description = "Upload too large")
    ),
    tag = "reports",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn submit_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<SubmitReportResponseDto>>)> {
    let (form, photos) = read_submission(multipart).await?;

    let (report, photo_count) = state.report_service.submit(&user, form, photos).await?;
    let mail_sent = state
        .mail_service
        .notify_submission(&report, &user, photo_count)
        .await;

    let message = format!("Report {} submitted", report.report_number);
    let dto = SubmitReportResponseDto {
        report_number: report.report_number,
        photo_count,
        mail_sent,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(dto), Some(message), None)),
    ))
}

/// List reports, newest first
///
/// Admins see every report; everyone else sees their own.
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reports",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_reports(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports: Vec<ReportResponseDto> = state
        .report_service
        .list_for(&user)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = reports.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// Printable report with the hunter's licences and photo URLs
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportDetailResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your report"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports",
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReportDetailResponseDto>>> {
    let detail = state.report_service.get_detail(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        for value in ["on", "yes", "true", "1", "Yes"] {
            assert!(is_truthy(value), "{}", value);
        }
        for value in ["", "0", "false", "no", "OFF"] {
            assert!(!is_truthy(value), "{}", value);
        }
    }
}
