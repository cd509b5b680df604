use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::members::models::MemberLicence;
use crate::features::reports::models::{split_list, AnimalSex, Report};
use crate::shared::validation::TIME_REGEX;

/// One entry of the sex selector
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SexOptionDto {
    pub value: AnimalSex,
    pub label: String,
}

/// Choice lists for the submission form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FormOptionsDto {
    pub locations: Vec<String>,
    pub animals: Vec<String>,
    pub tasks: Vec<String>,
    /// Roster names offered as hunter and team members
    pub members: Vec<String>,
    pub sexes: Vec<SexOptionDto>,
}

/// Text fields of a submission, collected from the multipart form
#[derive(Debug, Clone, Default, Validate)]
pub struct SubmitReportForm {
    /// Activity date, YYYY-MM-DD
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,

    #[validate(regex(path = *TIME_REGEX, message = "start_time must be HH:MM"))]
    pub start_time: String,

    #[validate(regex(path = *TIME_REGEX, message = "end_time must be HH:MM"))]
    pub end_time: String,

    #[validate(length(min = 1, message = "method is required"))]
    pub method: String,

    #[validate(length(min = 1, message = "hunter is required"))]
    pub hunter: String,

    pub team_members: Vec<String>,

    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,

    #[validate(length(min = 1, message = "animal is required"))]
    pub animal: String,

    #[validate(length(min = 1, message = "sex is required"))]
    pub sex: String,

    pub tasks: Vec<String>,

    pub tail_submitted: bool,
}

impl SubmitReportForm {
    /// Strip surrounding whitespace so a blank entry fails validation
    pub fn trimmed(self) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            date: trim(self.date),
            start_time: trim(self.start_time),
            end_time: trim(self.end_time),
            method: trim(self.method),
            hunter: trim(self.hunter),
            location: trim(self.location),
            animal: trim(self.animal),
            sex: trim(self.sex),
            ..self
        }
    }
}

/// Submission form for OpenAPI documentation.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SubmitReportDoc {
    #[schema(example = "2024-05-21")]
    pub date: String,
    #[schema(example = "06:00")]
    pub start_time: String,
    #[schema(example = "09:30")]
    pub end_time: String,
    #[schema(example = "Box trap")]
    pub method: String,
    pub hunter: String,
    /// Repeat the field once per team member
    pub team_members: Vec<String>,
    pub location: String,
    pub animal: String,
    pub sex: AnimalSex,
    /// Repeat the field once per task
    pub tasks: Vec<String>,
    /// Present with any truthy value ("on", "yes", "true", "1") when the tail was handed in
    pub tail_submitted: Option<String>,
    /// Repeat once per photo (jpg, jpeg, png, gif)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photos: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponseDto {
    pub report_number: String,
    pub photo_count: usize,
    /// Whether the municipal contact was actually notified
    pub mail_sent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    pub report_number: String,
    pub user_name: String,
    pub activity_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub method: String,
    pub hunter: String,
    pub team_members: Vec<String>,
    pub location: String,
    pub animal: String,
    pub sex: AnimalSex,
    pub tasks: Vec<String>,
    pub tail_submitted: bool,
    pub email_sent: bool,
    pub email_sent_at: Option<NaiveDateTime>,
    pub email_sent_by: Option<String>,
    /// `None` once photos were removed by the retention sweep
    pub photo_upload_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            team_members: r
                .team_members
                .as_deref()
                .map(split_list)
                .unwrap_or_default(),
            tasks: split_list(&r.tasks),
            report_number: r.report_number,
            user_name: r.user_name,
            activity_date: r.activity_date,
            start_time: r.start_time,
            end_time: r.end_time,
            method: r.method,
            hunter: r.hunter,
            location: r.location,
            animal: r.animal,
            sex: r.sex,
            tail_submitted: r.tail_submitted,
            email_sent: r.email_sent,
            email_sent_at: r.email_sent_at,
            email_sent_by: r.email_sent_by,
            photo_upload_date: r.photo_upload_date,
            created_at: r.created_at,
        }
    }
}

/// Everything the printable report shows
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportDetailResponseDto {
    pub report: ReportResponseDto,
    /// Hunter's licence numbers; all empty when the hunter is not on the roster
    pub licence: MemberLicence,
    /// Photo URLs sorted by file name
    pub photos: Vec<String>,
    /// Print date
    pub today: NaiveDate,
}
