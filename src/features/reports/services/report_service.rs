use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::members::services::{MemberService, ROSTER_FILE};
use crate::features::reports::dtos::{
    FormOptionsDto, ReportDetailResponseDto, SexOptionDto, SubmitReportForm,
};
use crate::features::reports::models::{AnimalSex, Report, REPORT_COLUMNS};
use crate::features::reports::services::report_number;
use crate::modules::storage::{PhotoStore, PhotoUpload};
use crate::shared::constants::PHOTO_EXTENSIONS;
use crate::shared::{csv_list, time};

const LOCATIONS_FILE: &str = "locations.csv";
const ANIMALS_FILE: &str = "animals.csv";
const TASKS_FILE: &str = "tasks.csv";

/// Join multi-value form fields the way they are stored
fn join_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Report submission, listing and the print view
pub struct ReportService {
    pool: SqlitePool,
    photos: Arc<PhotoStore>,
    members: Arc<MemberService>,
    data_dir: PathBuf,
    min_photo_count: usize,
}

impl ReportService {
    pub fn new(
        pool: SqlitePool,
        photos: Arc<PhotoStore>,
        members: Arc<MemberService>,
        data_dir: PathBuf,
        min_photo_count: usize,
    ) -> Self {
        Self {
            pool,
            photos,
            members,
            data_dir,
            min_photo_count,
        }
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    async fn load_list(&self, file_name: &str) -> Vec<String> {
        let path = self.data_dir.join(file_name);
        match csv_list::load_first_column(&path).await {
            Ok(Some(values)) => values,
            Ok(None) => {
                tracing::warn!("Choice list not found: {}", path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to read choice list {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Choice lists for the submission form
    pub async fn form_options(&self) -> FormOptionsDto {
        FormOptionsDto {
            locations: self.load_list(LOCATIONS_FILE).await,
            animals: self.load_list(ANIMALS_FILE).await,
            tasks: self.load_list(TASKS_FILE).await,
            members: self.load_list(ROSTER_FILE).await,
            sexes: AnimalSex::ALL
                .into_iter()
                .map(|sex| SexOptionDto {
                    value: sex,
                    label: sex.label().to_string(),
                })
                .collect(),
        }
    }

    /// Store a new report and its photos.
    ///
    /// Every check runs before the first database write. If the photos
    /// cannot be written the report row is removed again.
    pub async fn submit(
        &self,
        user: &AuthenticatedUser,
        form: SubmitReportForm,
        photos: Vec<PhotoUpload>,
    ) -> Result<(Report, usize)> {
        if photos.len() < self.min_photo_count {
            return Err(AppError::Validation(format!(
                "At least {} photo(s) required; received {}",
                self.min_photo_count,
                photos.len()
            )));
        }

        if let Some(bad) = photos
            .iter()
            .find(|p| !PhotoStore::is_photo_file(&p.file_name))
        {
            return Err(AppError::BadRequest(format!(
                "Unsupported photo file '{}'. Allowed types: {}",
                bad.file_name,
                PHOTO_EXTENSIONS.join(", ")
            )));
        }

        let form = form.trimmed();
        form.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let activity_date = NaiveDate::parse_from_str(&form.date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation("date must be YYYY-MM-DD".to_string()))?;
        let sex: AnimalSex = form.sex.parse().map_err(AppError::Validation)?;
        let team_members = Some(join_list(&form.team_members)).filter(|t| !t.is_empty());

        let number = report_number::allocate(&self.pool, time::today()).await?;
        let now = time::now();

        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (
                report_number, user_name, activity_date, start_time, end_time, method,
                hunter, team_members, location, animal, sex, tasks, tail_submitted,
                photo_upload_date, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(&number)
        .bind(&user.name)
        .bind(activity_date)
        .bind(&form.start_time)
        .bind(&form.end_time)
        .bind(&form.method)
        .bind(&form.hunter)
        .bind(team_members)
        .bind(&form.location)
        .bind(&form.animal)
        .bind(sex)
        .bind(join_list(&form.tasks))
        .bind(form.tail_submitted)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Report number {} was taken by a concurrent submission; please submit again",
                    number
                ))
            } else {
                tracing::error!("Failed to insert report: {:?}", e);
                AppError::Database(e)
            }
        })?;

        let stored = match self.photos.save_photos(&number, &photos).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Failed to store photos for {}: {:?}", number, e);
                self.discard(&report).await;
                return Err(e);
            }
        };

        tracing::info!(
            "Report {} submitted by {} with {} photo(s)",
            report.report_number,
            user.name,
            stored.len()
        );
        Ok((report, stored.len()))
    }

    /// Undo a half-finished submission
    async fn discard(&self, report: &Report) {
        if let Err(e) = sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(report.id)
            .execute(&self.pool)
            .await
        {
            tracing::error!("Failed to roll back report {}: {:?}", report.report_number, e);
        }
        if let Err(e) = self.photos.remove_report_dir(&report.report_number).await {
            tracing::warn!(
                "Failed to remove photos of {}: {:?}",
                report.report_number,
                e
            );
        }
    }

    /// Admins see every report, everyone else only their own; newest first
    pub async fn list_for(&self, user: &AuthenticatedUser) -> Result<Vec<Report>> {
        let query = if user.is_admin() {
            sqlx::query_as::<_, Report>(&format!(
                "SELECT {} FROM reports ORDER BY LENGTH(report_number) DESC, report_number DESC",
                REPORT_COLUMNS
            ))
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, Report>(&format!(
                r#"
                SELECT {} FROM reports WHERE user_name = ?
                ORDER BY LENGTH(report_number) DESC, report_number DESC
                "#,
                REPORT_COLUMNS
            ))
            .bind(&user.name)
            .fetch_all(&self.pool)
            .await
        };

        query.map_err(|e| {
            tracing::error!("Failed to list reports: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = ?",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Print view: the report, the hunter's licences and photo URLs
    pub async fn get_detail(
        &self,
        user: &AuthenticatedUser,
        id: i64,
    ) -> Result<ReportDetailResponseDto> {
        let report = self.get_by_id(id).await?;

        if !user.can_view_report_of(&report.user_name) {
            return Err(AppError::Forbidden(
                "You can only view your own reports".to_string(),
            ));
        }

        let licence = self
            .members
            .licence_for(&report.hunter)
            .await?
            .unwrap_or_default();

        let photos = self
            .photos
            .list_photos(&report.report_number)
            .await?
            .iter()
            .map(|file| PhotoStore::photo_url(&report.report_number, file))
            .collect();

        Ok(ReportDetailResponseDto {
            report: report.into(),
            licence,
            photos,
            today: time::today(),
        })
    }
}
