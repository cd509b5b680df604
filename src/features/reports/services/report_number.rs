//! Report numbers: `YYYYMMDD` followed by a zero-padded daily sequence.
//!
//! The sequence is at least three digits wide and simply grows past 999,
//! so "longest first, then lexically largest" is the numeric order.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{REPORT_NUMBER_MAX_ATTEMPTS, REPORT_NUMBER_SEQUENCE_WIDTH};

const DATE_PREFIX_LEN: usize = 8;

pub fn date_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn format_report_number(date: NaiveDate, sequence: i64) -> String {
    format!(
        "{}{:0width$}",
        date_prefix(date),
        sequence,
        width = REPORT_NUMBER_SEQUENCE_WIDTH
    )
}

/// Daily sequence of a report number, `None` when malformed
pub fn parse_sequence(report_number: &str) -> Option<i64> {
    report_number
        .get(DATE_PREFIX_LEN..)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Pick the next free report number for `date`.
///
/// Each attempt re-reads the current maximum and probes one candidate
/// further along, so a number taken between the two queries is stepped over.
/// Nothing is reserved: two concurrent callers can still receive the same
/// number, and the UNIQUE constraint rejects the second insert.
pub async fn allocate(pool: &SqlitePool, date: NaiveDate) -> Result<String> {
    let pattern = format!("{}%", date_prefix(date));

    for attempt in 0..REPORT_NUMBER_MAX_ATTEMPTS {
        let latest: Option<String> = sqlx::query_scalar(
            r#"
            SELECT report_number FROM reports
            WHERE report_number LIKE ?
            ORDER BY LENGTH(report_number) DESC, report_number DESC
            LIMIT 1
            "#,
        )
        .bind(&pattern)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read latest report number: {:?}", e);
            AppError::Database(e)
        })?;

        let sequence = match latest.as_deref().and_then(parse_sequence) {
            Some(current) => current + 1 + attempt,
            None => 1 + attempt,
        };
        let candidate = format_report_number(date, sequence);

        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE report_number = ?")
                .bind(&candidate)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to probe report number: {:?}", e);
                    AppError::Database(e)
                })?;

        if taken == 0 {
            return Ok(candidate);
        }

        tracing::debug!("Report number {} already taken, retrying", candidate);
    }

    tracing::warn!(
        "Gave up allocating a report number for {} after {} attempts",
        date,
        REPORT_NUMBER_MAX_ATTEMPTS
    );
    Err(AppError::Conflict(
        "Failed to allocate report number".to_string(),
    ))
}
