//! Marks snapshots of streams that stopped being refreshed as offline.

use crate::background_jobs::tiers::STALE_SWEEP_JOB_ID;
use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use std::time::Duration;
use tracing::info;

pub struct StaleSweepJob {
    stale_after: Duration,
}

impl StaleSweepJob {
    pub fn new(stale_after: Duration) -> Self {
        Self { stale_after }
    }
}

impl BackgroundJob for StaleSweepJob {
    fn id(&self) -> &'static str {
        STALE_SWEEP_JOB_ID
    }

    fn name(&self) -> &'static str {
        "Stale Now Playing Sweep"
    }

    fn description(&self) -> &'static str {
        "Rewrite snapshots not refreshed recently to the offline snapshot"
    }

    fn time_bound(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let cutoff = ctx.clock.now() - self.stale_after.as_secs() as i64;
        let swept = ctx
            .station_store
            .mark_stale_offline(cutoff)
            .map_err(|e| JobError::Persistence(e.to_string()))?;

        if swept > 0 {
            info!("Marked {} stale stream snapshots offline", swept);
        }
        Ok(())
    }
}
