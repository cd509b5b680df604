use chrono::{Duration, NaiveDateTime};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::config::CleanupConfig;
use crate::core::error::{AppError, Result};
use crate::features::photos::dtos::{
    CleanupOverviewDto, CleanupResultDto, DeletedPhotoDirDto, PendingPhotoDirDto,
};
use crate::modules::storage::PhotoStore;

/// Retires report photos after the retention period.
///
/// Only the files go. The report row stays, with `photo_upload_date`
/// cleared so the report is not picked up again.
pub struct PhotoCleanupService {
    pool: SqlitePool,
    photos: Arc<PhotoStore>,
    config: CleanupConfig,
}

impl PhotoCleanupService {
    pub fn new(pool: SqlitePool, photos: Arc<PhotoStore>, config: CleanupConfig) -> Self {
        Self {
            pool,
            photos,
            config,
        }
    }

    pub fn config(&self) -> &CleanupConfig {
        &self.config
    }

    /// `now` minus `days`, rejecting periods the calendar cannot represent
    pub fn cutoff(days: i64, now: NaiveDateTime) -> Result<NaiveDateTime> {
        Duration::try_days(days)
            .and_then(|period| now.checked_sub_signed(period))
            .ok_or_else(|| {
                AppError::BadRequest(format!("Retention period of {} days is out of range", days))
            })
    }

    async fn expired(&self, cutoff: NaiveDateTime) -> Result<Vec<PendingPhotoDirDto>> {
        sqlx::query_as::<_, PendingPhotoDirDto>(
            r#"
            SELECT report_number, photo_upload_date AS upload_date
            FROM reports
            WHERE photo_upload_date IS NOT NULL AND photo_upload_date < ?
            ORDER BY photo_upload_date ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list expired photo uploads: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn clear_upload_date(&self, report_number: &str) -> Result<()> {
        sqlx::query("UPDATE reports SET photo_upload_date = NULL WHERE report_number = ?")
            .bind(report_number)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear upload date for {}: {:?}", report_number, e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    /// Remove photo directories uploaded more than `days` days before `now`.
    ///
    /// A report whose directory cannot be removed keeps its upload date and
    /// is retried on the next run.
    pub async fn cleanup_old_photos(
        &self,
        days: i64,
        now: NaiveDateTime,
    ) -> Result<CleanupResultDto> {
        let cutoff = Self::cutoff(days, now)?;
        let expired = self.expired(cutoff).await?;

        let mut deleted_reports = Vec::new();
        for pending in expired {
            let removed = match self.photos.remove_report_dir(&pending.report_number).await {
                Ok(removed) => removed,
                Err(e) => {
                    tracing::error!(
                        "Failed to remove photos of report {}: {}",
                        pending.report_number,
                        e
                    );
                    continue;
                }
            };

            if let Err(e) = self.clear_upload_date(&pending.report_number).await {
                tracing::error!("Skipping report {}: {}", pending.report_number, e);
                continue;
            }

            if let Some(size) = removed {
                deleted_reports.push(DeletedPhotoDirDto {
                    report_number: pending.report_number,
                    upload_date: pending.upload_date,
                    size,
                });
            }
        }

        let deleted_bytes = deleted_reports.iter().map(|r| r.size).sum();
        tracing::info!(
            "Photo cleanup removed {} directories ({} bytes), cutoff {}",
            deleted_reports.len(),
            deleted_bytes,
            cutoff
        );

        Ok(CleanupResultDto {
            deleted_count: deleted_reports.len(),
            deleted_bytes,
            deleted_reports,
            cutoff,
        })
    }

    /// Sweep with the configured retention period
    pub async fn execute(&self, now: NaiveDateTime) -> Result<CleanupResultDto> {
        self.cleanup_old_photos(self.config.retention_days, now)
            .await
    }

    pub async fn overview(&self, now: NaiveDateTime) -> Result<CleanupOverviewDto> {
        let cutoff = Self::cutoff(self.config.retention_days, now)?;

        let reports_with_photos: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE photo_upload_date IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count reports with photos: {:?}", e);
                    AppError::Database(e)
                })?;

        let pending = self.expired(cutoff).await?;

        Ok(CleanupOverviewDto {
            reports_with_photos,
            past_cutoff: pending.len() as i64,
            total_size: self.photos.total_size().await?,
            cutoff,
            pending,
            retention_days: self.config.retention_days,
            enabled: self.config.enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::test_pool;

    struct Fixture {
        svc: PhotoCleanupService,
        pool: SqlitePool,
        photos: Arc<PhotoStore>,
        _tmp: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let photos = Arc::new(PhotoStore::new(tmp.path().join("uploads")));
        let config = CleanupConfig {
            retention_days: 60,
            enabled: true,
            hour: 2,
        };
        let svc = PhotoCleanupService::new(pool.clone(), photos.clone(), config);
        Fixture {
            svc,
            pool,
            photos,
            _tmp: tmp,
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    async fn insert(pool: &SqlitePool, number: &str, uploaded: Option<NaiveDateTime>) {
        sqlx::query(
            r#"
            INSERT INTO reports (report_number, user_name, activity_date, start_time, end_time,
                                 method, hunter, location, animal, sex, photo_upload_date,
                                 created_at)
            VALUES (?, 'Taro', '2024-01-10', '06:00', '09:00', 'Trap', 'Taro',
                    'North ridge', 'Boar', 'male', ?, '2024-01-10 09:30:00')
            "#,
        )
        .bind(number)
        .bind(uploaded)
        .execute(pool)
        .await
        .unwrap();
    }

    fn write_photo(photos: &PhotoStore, number: &str, bytes: usize) {
        let dir = photos.report_dir(number).unwrap();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("01_a.jpg"), vec![0u8; bytes]).unwrap();
    }

    async fn upload_date(pool: &SqlitePool, number: &str) -> Option<NaiveDateTime> {
        sqlx::query_scalar("SELECT photo_upload_date FROM reports WHERE report_number = ?")
            .bind(number)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_old_photos_removed_and_row_kept() {
        let f = fixture().await;
        insert(&f.pool, "20240110001", Some(at("2024-01-10 09:30:00"))).await;
        insert(&f.pool, "20240501001", Some(at("2024-05-01 08:00:00"))).await;
        write_photo(&f.photos, "20240110001", 100);
        write_photo(&f.photos, "20240501001", 50);

        let result = f
            .svc
            .cleanup_old_photos(60, at("2024-05-21 02:00:00"))
            .await
            .unwrap();

        assert_eq!(result.deleted_count, 1);
        assert_eq!(result.deleted_bytes, 100);
        assert_eq!(result.cutoff, at("2024-03-22 02:00:00"));
        assert_eq!(result.deleted_reports[0].report_number, "20240110001");
        assert_eq!(result.deleted_reports[0].upload_date, at("2024-01-10 09:30:00"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&f.pool)
            .await
            .unwrap();
        assert_eq!(rows, 2);
        assert_eq!(upload_date(&f.pool, "20240110001").await, None);
        assert!(upload_date(&f.pool, "20240501001").await.is_some());
        assert!(!f.photos.report_dir("20240110001").unwrap().exists());
        assert!(f.photos.report_dir("20240501001").unwrap().exists());
    }

    #[tokio::test]
    async fn test_missing_directory_still_clears_date() {
        let f = fixture().await;
        insert(&f.pool, "20240110001", Some(at("2024-01-10 09:30:00"))).await;

        let result = f
            .svc
            .cleanup_old_photos(60, at("2024-05-21 02:00:00"))
            .await
            .unwrap();

        assert_eq!(result.deleted_count, 0);
        assert!(result.deleted_reports.is_empty());
        assert_eq!(upload_date(&f.pool, "20240110001").await, None);
    }

    #[tokio::test]
    async fn test_second_run_finds_nothing() {
        let f = fixture().await;
        insert(&f.pool, "20240110001", Some(at("2024-01-10 09:30:00"))).await;
        write_photo(&f.photos, "20240110001", 10);
        let now = at("2024-05-21 02:00:00");

        f.svc.cleanup_old_photos(60, now).await.unwrap();
        let again = f.svc.cleanup_old_photos(60, now).await.unwrap();
        assert_eq!(again.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_reports_without_upload_date_ignored() {
        let f = fixture().await;
        insert(&f.pool, "20240110001", None).await;
        write_photo(&f.photos, "20240110001", 10);

        let result = f.svc.execute(at("2024-05-21 02:00:00")).await.unwrap();
        assert_eq!(result.deleted_count, 0);
        assert!(f.photos.report_dir("20240110001").unwrap().exists());
    }

    #[tokio::test]
    async fn test_overview() {
        let f = fixture().await;
        insert(&f.pool, "20240201001", Some(at("2024-02-01 10:00:00"))).await;
        insert(&f.pool, "20240110001", Some(at("2024-01-10 09:30:00"))).await;
        insert(&f.pool, "20240501001", Some(at("2024-05-01 08:00:00"))).await;
        insert(&f.pool, "20231201001", None).await;
        write_photo(&f.photos, "20240110001", 30);
        write_photo(&f.photos, "20240501001", 12);

        let overview = f.svc.overview(at("2024-05-21 02:00:00")).await.unwrap();

        assert_eq!(overview.reports_with_photos, 3);
        assert_eq!(overview.past_cutoff, 2);
        assert_eq!(overview.total_size, 42);
        assert_eq!(overview.retention_days, 60);
        assert!(overview.enabled);
        let pending: Vec<_> = overview
            .pending
            .iter()
            .map(|p| p.report_number.as_str())
            .collect();
        assert_eq!(pending, ["20240110001", "20240201001"]);
    }

    #[test]
    fn test_cutoff_out_of_range_is_an_error() {
        let now = at("2024-05-21 02:00:00");
        assert_eq!(
            PhotoCleanupService::cutoff(60, now).unwrap(),
            at("2024-03-22 02:00:00")
        );
        assert!(matches!(
            PhotoCleanupService::cutoff(100_000_000, now),
            Err(AppError::BadRequest(_))
        ));
        assert!(PhotoCleanupService::cutoff(i64::MAX, now).is_err());
    }

    #[tokio::test]
    async fn test_huge_retention_fails_without_panicking() {
        let f = fixture().await;
        insert(&f.pool, "20240110001", Some(at("2024-01-10 09:30:00"))).await;

        let result = f
            .svc
            .cleanup_old_photos(100_000_000, at("2024-05-21 02:00:00"))
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(upload_date(&f.pool, "20240110001").await.is_some());
    }
}
