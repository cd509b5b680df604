use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::sync::Arc;

use crate::features::photos::services::PhotoCleanupService;
use crate::shared::time;

/// Next run at `hour:00` strictly after `now`
pub fn next_run_after(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Daily photo retention sweep
pub struct PhotoCleanupWorker {
    service: Arc<PhotoCleanupService>,
}

impl PhotoCleanupWorker {
    pub fn new(service: Arc<PhotoCleanupService>) -> Self {
        Self { service }
    }

    /// Sleep until the configured hour, sweep, repeat
    pub async fn run(&self) {
        let hour = self.service.config().hour;
        tracing::info!(
            "Starting photo cleanup worker (daily at {:02}:00, retention {} days)",
            hour,
            self.service.config().retention_days
        );

        loop {
            let now = time::now();
            let next = next_run_after(now, hour);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!("Next photo cleanup at {}", next);
            tokio::time::sleep(wait).await;

            match self.service.execute(time::now()).await {
                Ok(result) => tracing::info!(
                    "Scheduled photo cleanup finished: {} directories, {} bytes",
                    result.deleted_count,
                    result.deleted_bytes
                ),
                Err(e) => tracing::error!("Scheduled photo cleanup failed: {:?}", e),
            }
        }
    }
}
