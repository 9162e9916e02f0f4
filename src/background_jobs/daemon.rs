use super::sync_manager::{SyncManager, TierRunOutcome};
use super::tiers::SyncTier;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Trigger every tier on its own interval until the manager's cancellation
/// token fires.
///
/// Each tier gets one task; a tier never overlaps itself because the next tick
/// waits for the previous blocking run. Different tiers may run side by side.
pub async fn run_daemon(manager: Arc<SyncManager>) {
    let shutdown = manager.context().cancellation_token.clone();
    info!(
        "Starting sync daemon with {} registered jobs",
        manager.job_count()
    );

    let mut tasks = JoinSet::new();
    for tier in SyncTier::ALL {
        tasks.spawn(run_tier_loop(Arc::clone(&manager), tier));
    }

    shutdown.cancelled().await;
    info!("Sync daemon received shutdown signal");

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            error!("Tier loop ended abnormally: {}", e);
        }
    }
    info!("Sync daemon stopped");
}

async fn run_tier_loop(manager: Arc<SyncManager>, tier: SyncTier) {
    let shutdown = manager.context().cancellation_token.clone();
    let mut ticker = tokio::time::interval(tier.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(
        "{} tier every {:?}, bounded by {:?} of job time",
        tier,
        tier.interval(),
        manager.tier_time_bound(tier)
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.cancelled() => break,
        }

        let run_manager = Arc::clone(&manager);
        let result = tokio::task::spawn_blocking(move || run_manager.run_tier(tier, false)).await;

        match result {
            Ok(Ok(TierRunOutcome::Ran(report))) => {
                let failed = report.failed_jobs().count();
                if failed > 0 {
                    warn!("{} sync finished with {} failed job(s)", tier, failed);
                }
            }
            Ok(Ok(TierRunOutcome::Skipped { .. })) => {}
            Ok(Err(e)) => error!("{} sync could not run: {}", tier, e),
            Err(e) => error!("{} sync panicked: {}", tier, e),
        }
    }
}
