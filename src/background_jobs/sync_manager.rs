use super::context::JobContext;
use super::job::{BackgroundJob, JobError};
use super::status::TierStatus;
use super::tiers::SyncTier;
use crate::clock::UnixTimestamp;
use crate::settings_store::{get_i64_setting, set_i64_setting, SettingsStore};
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A run started less than this long ago is presumed still in flight.
pub const ENTRY_GUARD_WINDOW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("watermark store failure: {0:#}")]
    Watermark(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRunStatus {
    Completed,
    Failed(String),
    /// The tier lists the job but none was registered (e.g. a disabled catalog).
    NotRegistered,
}

#[derive(Debug, Clone)]
pub struct JobRunRecord {
    pub job_id: &'static str,
    pub status: JobRunStatus,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct TierRunReport {
    pub tier: SyncTier,
    pub started_at: UnixTimestamp,
    /// `None` when a job left work undone and the completion watermark was kept.
    pub completed_at: Option<UnixTimestamp>,
    pub jobs: Vec<JobRunRecord>,
}

impl TierRunReport {
    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobRunRecord> {
        self.jobs
            .iter()
            .filter(|j| matches!(j.status, JobRunStatus::Failed(_)))
    }
}

#[derive(Debug, Clone)]
pub enum TierRunOutcome {
    /// The entry guard found a run still in flight; nothing was done.
    Skipped { last_started_at: UnixTimestamp },
    Ran(TierRunReport),
}

/// Runs sync tiers against registered jobs and owns the tier watermarks.
pub struct SyncManager {
    settings: Arc<dyn SettingsStore>,
    jobs: HashMap<&'static str, Arc<dyn BackgroundJob>>,
    context: JobContext,
}

impl SyncManager {
    pub fn new(settings: Arc<dyn SettingsStore>, context: JobContext) -> Self {
        Self {
            settings,
            jobs: HashMap::new(),
            context,
        }
    }

    /// Register a job. Its id decides which tier slot it fills.
    pub fn register_job(&mut self, job: Arc<dyn BackgroundJob>) {
        info!("Registering job: {} - {}", job.id(), job.description());
        if SyncTier::ALL
            .iter()
            .all(|t| t.job_slots().iter().all(|s| s.job_id != job.id()))
        {
            warn!("Job {} is not part of any tier and will never run", job.id());
        }
        self.jobs.insert(job.id(), job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn context(&self) -> &JobContext {
        &self.context
    }

    /// Sum of the time bounds of the registered jobs in `tier`.
    pub fn tier_time_bound(&self, tier: SyncTier) -> Duration {
        tier.job_slots()
            .iter()
            .filter_map(|slot| self.jobs.get(slot.job_id))
            .map(|job| job.time_bound())
            .sum()
    }

    /// One invocation of `tier`.
    ///
    /// The now-playing tier is skipped when its last start is newer than its
    /// last completion and less than a minute old, unless `force` is set.
    /// Otherwise the start watermark is written, every job runs in slot order,
    /// and the completion watermark is written unless a job was cancelled or
    /// hit a persistence failure.
    pub fn run_tier(&self, tier: SyncTier, force: bool) -> Result<TierRunOutcome, SyncError> {
        let now = self.context.clock.now();

        if tier.has_entry_guard() && !force {
            let last_started_at = self.read_watermark(tier.started_key())?;
            let last_run_at = self.read_watermark(tier.last_run_key())?;
            if last_started_at > last_run_at
                && last_started_at >= now - ENTRY_GUARD_WINDOW_SECS
            {
                info!(
                    "Skipping {} sync: run started at {} has not finished",
                    tier, last_started_at
                );
                return Ok(TierRunOutcome::Skipped { last_started_at });
            }
        }

        info!("Starting {} sync{}", tier, if force { " (forced)" } else { "" });
        self.write_watermark(tier.started_key(), now)?;

        let mut jobs = Vec::with_capacity(tier.job_slots().len());
        let mut complete = true;

        for slot in tier.job_slots() {
            let Some(job) = self.jobs.get(slot.job_id) else {
                debug!("No job registered for {}, skipping", slot.job_id);
                jobs.push(JobRunRecord {
                    job_id: slot.job_id,
                    status: JobRunStatus::NotRegistered,
                    elapsed: Duration::ZERO,
                });
                continue;
            };

            if self.context.is_cancelled() {
                info!("{} sync cancelled before {}", tier, slot.job_id);
                complete = false;
                break;
            }

            info!("Starting job: {}", job.id());
            let start_time = Instant::now();
            let result = job.execute(&self.context);
            let elapsed = start_time.elapsed();

            let status = match result {
                Ok(()) => {
                    info!("Job {} completed successfully in {:?}", job.id(), elapsed);
                    JobRunStatus::Completed
                }
                Err(e) => {
                    if matches!(e, JobError::Cancelled) {
                        info!("Job {} was cancelled after {:?}", job.id(), elapsed);
                    } else {
                        error!("Job {} failed after {:?}: {}", job.id(), elapsed, e);
                    }
                    if !e.allows_completion() {
                        complete = false;
                    }
                    JobRunStatus::Failed(e.to_string())
                }
            };
            jobs.push(JobRunRecord {
                job_id: slot.job_id,
                status,
                elapsed,
            });

            if !complete {
                warn!("{} sync stopped after {}; work was left undone", tier, slot.job_id);
                break;
            }
        }

        let completed_at = if complete {
            let finished = self.context.clock.now();
            self.write_watermark(tier.last_run_key(), finished)?;
            info!("Finished {} sync", tier);
            Some(finished)
        } else {
            None
        };

        Ok(TierRunOutcome::Ran(TierRunReport {
            tier,
            started_at: now,
            completed_at,
            jobs,
        }))
    }

    /// Status of every tier, in tier order. Read-only.
    pub fn sync_times(&self) -> Result<Vec<TierStatus>, SyncError> {
        let now = self.context.clock.now();
        SyncTier::ALL
            .iter()
            .map(|tier| {
                let last_run_at = self.read_watermark(tier.last_run_key())?;
                Ok(TierStatus::new(
                    tier.key(),
                    tier.name(),
                    tier.job_slots().iter().map(|s| s.name).collect(),
                    last_run_at,
                    now,
                ))
            })
            .collect()
    }

    fn read_watermark(&self, key: &str) -> Result<UnixTimestamp, SyncError> {
        let value = get_i64_setting(self.settings.as_ref(), key, 0)
            .with_context(|| format!("Failed to read {}", key))?;
        Ok(value)
    }

    fn write_watermark(&self, key: &str, value: UnixTimestamp) -> Result<(), SyncError> {
        set_i64_setting(self.settings.as_ref(), key, value)
            .with_context(|| format!("Failed to write {}", key))?;
        debug!("Watermark {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background_jobs::test_support::{test_env, TestEnv};
    use crate::background_jobs::tiers::{
        HISTORY_CLEANUP_JOB_ID, NOWPLAYING_JOB_ID, PONYFM_SYNC_JOB_ID, STALE_SWEEP_JOB_ID,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Succeed,
        Fail,
        FailPersistence,
    }

    struct TestJob {
        id: &'static str,
        behavior: Behavior,
        execution_count: Arc<AtomicUsize>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl BackgroundJob for TestJob {
        fn id(&self) -> &'static str {
            self.id
        }

        fn name(&self) -> &'static str {
            "Test Job"
        }

        fn description(&self) -> &'static str {
            "A test job for unit tests"
        }

        fn time_bound(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn execute(&self, _ctx: &JobContext) -> Result<(), JobError> {
            self.execution_count.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.id);
            match self.behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Fail => Err(JobError::ExecutionFailed("Test failure".to_string())),
                Behavior::FailPersistence => {
                    Err(JobError::Persistence("disk full".to_string()))
                }
            }
        }
    }

    struct Harness {
        env: TestEnv,
        manager: SyncManager,
        count: Arc<AtomicUsize>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    fn harness(jobs: Vec<(&'static str, Behavior)>) -> Harness {
        let env = test_env();
        let mut manager = SyncManager::new(env.settings.clone(), env.ctx.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));
        for (id, behavior) in jobs {
            manager.register_job(Arc::new(TestJob {
                id,
                behavior,
                execution_count: count.clone(),
                log: log.clone(),
            }));
        }
        Harness {
            env,
            manager,
            count,
            log,
        }
    }

    fn watermark(h: &Harness, key: &str) -> i64 {
        get_i64_setting(h.env.settings.as_ref(), key, 0).unwrap()
    }

    #[test]
    fn test_run_writes_both_watermarks() {
        let h = harness(vec![(NOWPLAYING_JOB_ID, Behavior::Succeed)]);

        let outcome = h.manager.run_tier(SyncTier::NowPlaying, false).unwrap();

        let TierRunOutcome::Ran(report) = outcome else {
            panic!("expected a run");
        };
        assert_eq!(report.completed_at, Some(1_000_000));
        assert_eq!(h.count.load(Ordering::SeqCst), 1);
        assert_eq!(watermark(&h, "nowplaying_last_started"), 1_000_000);
        assert_eq!(watermark(&h, "nowplaying_last_run"), 1_000_000);
    }

    #[test]
    fn test_guard_skips_run_in_flight() {
        let h = harness(vec![(NOWPLAYING_JOB_ID, Behavior::Succeed)]);
        set_i64_setting(h.env.settings.as_ref(), "nowplaying_last_started", 1_000_000 - 10).unwrap();
        set_i64_setting(h.env.settings.as_ref(), "nowplaying_last_run", 1_000_000 - 500).unwrap();

        let outcome = h.manager.run_tier(SyncTier::NowPlaying, false).unwrap();

        assert!(matches!(
            outcome,
            TierRunOutcome::Skipped { last_started_at } if last_started_at == 1_000_000 - 10
        ));
        assert_eq!(h.count.load(Ordering::SeqCst), 0);
        assert_eq!(watermark(&h, "nowplaying_last_started"), 1_000_000 - 10);
        assert_eq!(watermark(&h, "nowplaying_last_run"), 1_000_000 - 500);
    }

    #[test]
    fn test_force_bypasses_guard() {
        let h = harness(vec![(NOWPLAYING_JOB_ID, Behavior::Succeed)]);
        set_i64_setting(h.env.settings.as_ref(), "nowplaying_last_started", 1_000_000 - 10).unwrap();

        let outcome = h.manager.run_tier(SyncTier::NowPlaying, true).unwrap();

        assert!(matches!(outcome, TierRunOutcome::Ran(_)));
        assert_eq!(h.count.load(Ordering::SeqCst), 1);
        assert_eq!(watermark(&h, "nowplaying_last_started"), 1_000_000);
    }

    #[test]
    fn test_old_unfinished_run_does_not_block() {
        let h = harness(vec![(NOWPLAYING_JOB_ID, Behavior::Succeed)]);
        set_i64_setting(h.env.settings.as_ref(), "nowplaying_last_started", 1_000_000 - 61).unwrap();

        let outcome = h.manager.run_tier(SyncTier::NowPlaying, false).unwrap();

        assert!(matches!(outcome, TierRunOutcome::Ran(_)));
    }

    #[test]
    fn test_guard_only_applies_to_nowplaying() {
        let h = harness(vec![(STALE_SWEEP_JOB_ID, Behavior::Succeed)]);
        set_i64_setting(h.env.settings.as_ref(), "sync_fast_last_started", 1_000_000 - 10).unwrap();

        h.manager.run_tier(SyncTier::Short, false).unwrap();

        assert_eq!(h.count.load(Ordering::SeqCst), 1);
        assert_eq!(watermark(&h, "sync_fast_last_run"), 1_000_000);
    }

    #[test]
    fn test_failed_job_still_completes_tier() {
        let h = harness(vec![
            (HISTORY_CLEANUP_JOB_ID, Behavior::Fail),
            (PONYFM_SYNC_JOB_ID, Behavior::Succeed),
        ]);

        let TierRunOutcome::Ran(report) = h.manager.run_tier(SyncTier::Long, false).unwrap() else {
            panic!("expected a run");
        };

        assert_eq!(
            *h.log.lock().unwrap(),
            vec![HISTORY_CLEANUP_JOB_ID, PONYFM_SYNC_JOB_ID]
        );
        assert_eq!(report.failed_jobs().count(), 1);
        assert_eq!(report.jobs[2].status, JobRunStatus::NotRegistered);
        assert!(report.completed_at.is_some());
        assert_eq!(watermark(&h, "sync_slow_last_run"), 1_000_000);
    }

    #[test]
    fn test_persistence_failure_keeps_last_run() {
        let h = harness(vec![
            (HISTORY_CLEANUP_JOB_ID, Behavior::FailPersistence),
            (PONYFM_SYNC_JOB_ID, Behavior::Succeed),
        ]);
        set_i64_setting(h.env.settings.as_ref(), "sync_slow_last_run", 5).unwrap();

        let TierRunOutcome::Ran(report) = h.manager.run_tier(SyncTier::Long, false).unwrap() else {
            panic!("expected a run");
        };

        assert_eq!(report.completed_at, None);
        assert_eq!(*h.log.lock().unwrap(), vec![HISTORY_CLEANUP_JOB_ID]);
        assert_eq!(watermark(&h, "sync_slow_last_started"), 1_000_000);
        assert_eq!(watermark(&h, "sync_slow_last_run"), 5);
    }

    #[test]
    fn test_cancelled_context_stops_tier() {
        let h = harness(vec![(NOWPLAYING_JOB_ID, Behavior::Succeed)]);
        h.env.ctx.cancellation_token.cancel();

        let TierRunOutcome::Ran(report) = h.manager.run_tier(SyncTier::NowPlaying, false).unwrap()
        else {
            panic!("expected a run");
        };

        assert_eq!(report.completed_at, None);
        assert_eq!(h.count.load(Ordering::SeqCst), 0);
        assert_eq!(watermark(&h, "nowplaying_last_run"), 0);
    }

    #[test]
    fn test_sync_times() {
        let h = harness(vec![(NOWPLAYING_JOB_ID, Behavior::Succeed)]);
        h.manager.run_tier(SyncTier::NowPlaying, false).unwrap();
        h.env.clock.advance(90);

        let times = h.manager.sync_times().unwrap();

        assert_eq!(times.len(), 4);
        assert_eq!(times[0].key, "nowplaying");
        assert_eq!(times[0].last_run_at, 1_000_000);
        assert_eq!(times[0].seconds_since_last_run, 90);
        assert_eq!(times[0].human_readable_age, "1 minute");
        assert_eq!(times[3].name, "1-Hour Sync");
        assert_eq!(times[3].human_readable_age, "never");
        assert_eq!(
            times[3].contents,
            vec!["Song History Cleanup", "Pony.fm Sync", "EqBeats Sync"]
        );
    }

    #[test]
    fn test_tier_time_bound_sums_registered_jobs() {
        let h = harness(vec![
            (HISTORY_CLEANUP_JOB_ID, Behavior::Succeed),
            (PONYFM_SYNC_JOB_ID, Behavior::Succeed),
        ]);
        assert_eq!(h.manager.tier_time_bound(SyncTier::Long), Duration::from_secs(2));
        assert_eq!(h.manager.tier_time_bound(SyncTier::Medium), Duration::ZERO);
    }
}
