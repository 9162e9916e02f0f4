//! External catalog import job, one instance per provider.

use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use crate::catalog_sync::{CatalogSync, CatalogSyncError};
use std::time::Duration;

pub struct CatalogSyncJob {
    job_id: &'static str,
    sync: CatalogSync,
}

impl CatalogSyncJob {
    /// `job_id` picks the tier slot, e.g. `catalog_sync_ponyfm`.
    pub fn new(job_id: &'static str, sync: CatalogSync) -> Self {
        Self { job_id, sync }
    }
}

impl BackgroundJob for CatalogSyncJob {
    fn id(&self) -> &'static str {
        self.job_id
    }

    fn name(&self) -> &'static str {
        self.sync.provider().name()
    }

    fn description(&self) -> &'static str {
        "Mirror an external catalog's track listing into the song store"
    }

    /// Per page fetched.
    fn time_bound(&self) -> Duration {
        self.sync.timeout()
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        match self
            .sync
            .run(&ctx.songs, ctx.clock.now(), &ctx.cancellation_token)
        {
            Ok(_) => Ok(()),
            Err(CatalogSyncError::Cancelled) => Err(JobError::Cancelled),
            Err(CatalogSyncError::Store(e)) => Err(JobError::Persistence(format!("{:#}", e))),
            Err(e @ CatalogSyncError::FirstPageUnavailable { .. }) => {
                Err(JobError::ExecutionFailed(e.to_string()))
            }
        }
    }
}
