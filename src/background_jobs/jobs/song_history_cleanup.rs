//! Song history cleanup background job.
//!
//! Deletes song history rows older than the configured retention period.

use crate::background_jobs::tiers::HISTORY_CLEANUP_JOB_ID;
use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use std::time::Duration;
use tracing::info;

pub struct SongHistoryCleanupJob {
    retention_days: u64,
}

impl SongHistoryCleanupJob {
    pub fn new(retention_days: u64) -> Self {
        Self { retention_days }
    }
}

impl BackgroundJob for SongHistoryCleanupJob {
    fn id(&self) -> &'static str {
        HISTORY_CLEANUP_JOB_ID
    }

    fn name(&self) -> &'static str {
        "Song History Cleanup"
    }

    fn description(&self) -> &'static str {
        "Delete song history entries past the retention period"
    }

    fn time_bound(&self) -> Duration {
        Duration::from_secs(30)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let cutoff = ctx.clock.now() - (self.retention_days as i64 * 24 * 60 * 60);
        info!(
            "Cleaning up song history older than {} days (cutoff: {})",
            self.retention_days, cutoff
        );

        let deleted = ctx
            .station_store
            .delete_song_history_before(cutoff)
            .map_err(|e| JobError::Persistence(e.to_string()))?;

        if deleted > 0 {
            info!("Deleted {} old song history entries", deleted);
        } else {
            info!("No song history entries to clean up");
        }
        Ok(())
    }
}
