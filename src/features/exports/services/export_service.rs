use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::exports::dtos::{ExportQuery, ExportStatsDto};
use crate::features::members::services::MemberService;
use crate::features::reports::models::{Report, REPORT_COLUMNS};
use crate::modules::storage::PhotoStore;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const BASE_HEADERS: [&str; 13] = [
    "Report number",
    "Reporter",
    "Date",
    "Start time",
    "End time",
    "Method",
    "Hunter",
    "Team members",
    "Location",
    "Animal",
    "Sex",
    "Tasks",
    "Tail submitted",
];

const LICENCE_HEADERS: [&str; 6] = [
    "Large game permit",
    "Large game operator",
    "Large game instruction",
    "Small game permit",
    "Small game operator",
    "Small game instruction",
];

const PHOTO_HEADER: &str = "Photo count";

/// A rendered CSV download
#[derive(Debug)]
pub struct CsvExport {
    pub file_name: String,
    /// UTF-8 with a leading byte order mark
    pub body: Vec<u8>,
    pub row_count: usize,
}

fn parse_bound(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} must be YYYY-MM-DD", field))),
    }
}

/// `reports_<start>_<end>.csv` with both bounds, otherwise `reports_<today>.csv`
pub fn export_file_name(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("reports_{}_{}.csv", s.format("%Y%m%d"), e.format("%Y%m%d")),
        _ => format!("reports_{}.csv", today.format("%Y%m%d")),
    }
}

fn csv_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Failed to write CSV: {}", e))
}

/// Admin statistics and the spreadsheet export
pub struct ExportService {
    pool: SqlitePool,
    photos: Arc<PhotoStore>,
    members: Arc<MemberService>,
}

impl ExportService {
    pub fn new(pool: SqlitePool, photos: Arc<PhotoStore>, members: Arc<MemberService>) -> Self {
        Self {
            pool,
            photos,
            members,
        }
    }

    pub async fn stats(&self, today: NaiveDate) -> Result<ExportStatsDto> {
        let month_start = today.with_day(1).unwrap_or(today);

        let (total_reports, this_month_reports, unique_users): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN activity_date >= ? THEN 1 ELSE 0 END), 0),
                   COUNT(DISTINCT user_name)
            FROM reports
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute report stats: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(ExportStatsDto {
            total_reports,
            this_month_reports,
            unique_users,
        })
    }

    async fn reports_between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {} FROM reports
            WHERE (?1 IS NULL OR activity_date >= ?1)
              AND (?2 IS NULL OR activity_date <= ?2)
            ORDER BY LENGTH(report_number) DESC, report_number DESC
            "#,
            REPORT_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load reports for export: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn export_csv(&self, query: &ExportQuery, today: NaiveDate) -> Result<CsvExport> {
        let start = parse_bound(query.start_date.as_deref(), "start_date")?;
        let end = parse_bound(query.end_date.as_deref(), "end_date")?;

        let reports = self.reports_between(start, end).await?;
        let licences = if query.include_member_info {
            self.members.licences_by_name().await?
        } else {
            Default::default()
        };

        let mut body = UTF8_BOM.to_vec();
        {
            let mut writer = csv::Writer::from_writer(&mut body);

            let mut headers: Vec<&str> = BASE_HEADERS.to_vec();
            if query.include_member_info {
                headers.extend(LICENCE_HEADERS);
            }
            if query.include_photos {
                headers.push(PHOTO_HEADER);
            }
            writer.write_record(&headers).map_err(csv_error)?;

            for report in &reports {
                let mut record: Vec<String> = vec![
                    report.report_number.clone(),
                    report.user_name.clone(),
                    report.activity_date.format("%Y-%m-%d").to_string(),
                    report.start_time.clone(),
                    report.end_time.clone(),
                    report.method.clone(),
                    report.hunter.clone(),
                    report.team_members.clone().unwrap_or_default(),
                    report.location.clone(),
                    report.animal.clone(),
                    report.sex.label().to_string(),
                    report.tasks.clone(),
                    if report.tail_submitted {
                        "submitted"
                    } else {
                        "not submitted"
                    }
                    .to_string(),
                ];

                if query.include_member_info {
                    let columns = licences
                        .get(&report.hunter)
                        .map(|l| l.columns().map(str::to_string))
                        .unwrap_or_default();
                    record.extend(columns);
                }

                if query.include_photos {
                    let count = match self.photos.count_photos(&report.report_number).await {
                        Ok(count) => count,
                        Err(e) => {
                            tracing::warn!(
                                "Failed to count photos for {}: {}",
                                report.report_number,
                                e
                            );
                            0
                        }
                    };
                    record.push(count.to_string());
                }

                writer.write_record(&record).map_err(csv_error)?;
            }

            writer.flush().map_err(csv_error)?;
        }

        tracing::info!(
            "Exported {} reports (start: {:?}, end: {:?})",
            reports.len(),
            start,
            end
        );

        Ok(CsvExport {
            file_name: export_file_name(start, end, today),
            body,
            row_count: reports.len(),
        })
    }
}
