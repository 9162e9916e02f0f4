//! Song alias integrity watchdog.
//!
//! Walks the alias chain of every merged song and reports chains that cycle
//! or end at a missing record. Nothing is repaired automatically.

use crate::background_jobs::tiers::ALIAS_INTEGRITY_JOB_ID;
use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use crate::songs::SongError;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

const CANCEL_CHECK_EVERY: usize = 500;

pub struct SongAliasIntegrityJob;

impl BackgroundJob for SongAliasIntegrityJob {
    fn id(&self) -> &'static str {
        ALIAS_INTEGRITY_JOB_ID
    }

    fn name(&self) -> &'static str {
        "Song Alias Integrity"
    }

    fn description(&self) -> &'static str {
        "Report song alias chains that cycle or dangle"
    }

    fn time_bound(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        let aliased = ctx
            .songs
            .store()
            .get_aliased_songs()
            .map_err(|e| JobError::Persistence(e.to_string()))?;

        let mut cycles = 0;
        let mut dangling = 0;
        let mut reported_cycles: HashSet<Vec<String>> = HashSet::new();

        for (i, (id, target)) in aliased.iter().enumerate() {
            if i % CANCEL_CHECK_EVERY == 0 && ctx.is_cancelled() {
                return Err(JobError::Cancelled);
            }

            match ctx.songs.resolve(id) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!("Song {} aliases {} but the chain ends at a missing record", id, target);
                    dangling += 1;
                }
                Err(SongError::IdentityCycle { chain, .. }) => {
                    let mut members = chain;
                    members.sort();
                    members.dedup();
                    if reported_cycles.insert(members.clone()) {
                        error!("Song alias cycle: {}", members.join(", "));
                        cycles += 1;
                    }
                }
                Err(SongError::Store(e)) => return Err(JobError::Persistence(e.to_string())),
                Err(e) => return Err(JobError::ExecutionFailed(e.to_string())),
            }
        }

        info!(
            "Checked {} aliased songs: {} cycles, {} dangling",
            aliased.len(),
            cycles,
            dangling
        );

        if cycles + dangling > 0 {
            Err(JobError::ExecutionFailed(format!(
                "{} alias cycle(s), {} dangling alias(es)",
                cycles, dangling
            )))
        } else {
            Ok(())
        }
    }
}
