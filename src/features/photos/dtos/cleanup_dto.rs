use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A report whose photo directory was removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletedPhotoDirDto {
    pub report_number: String,
    pub upload_date: NaiveDateTime,
    /// Bytes freed
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CleanupResultDto {
    pub deleted_count: usize,
    pub deleted_bytes: u64,
    pub deleted_reports: Vec<DeletedPhotoDirDto>,
    /// Photos uploaded before this moment were retired
    pub cutoff: NaiveDateTime,
}

/// A report whose photos the next sweep will remove
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct PendingPhotoDirDto {
    pub report_number: String,
    pub upload_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CleanupOverviewDto {
    /// Reports that still have photos on disk
    pub reports_with_photos: i64,
    pub past_cutoff: i64,
    /// Bytes used by the whole upload directory
    pub total_size: u64,
    pub cutoff: NaiveDateTime,
    /// Oldest upload first
    pub pending: Vec<PendingPhotoDirDto>,
    pub retention_days: i64,
    /// Whether the daily sweep is scheduled
    pub enabled: bool,
}
