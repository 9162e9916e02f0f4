//! Tiered sync scheduling.
//!
//! Jobs are grouped into four tiers with fixed cadences and a fixed order.
//! [`SyncManager`] runs one tier invocation at a time and keeps the tier
//! watermarks in the settings store; [`run_daemon`] drives the tiers on their
//! intervals for long-lived deployments, while cron-style callers invoke
//! [`SyncManager::run_tier`] directly.

mod context;
mod daemon;
mod job;
pub mod jobs;
mod status;
mod sync_manager;
pub mod tiers;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::JobContext;
pub use daemon::run_daemon;
pub use job::{BackgroundJob, JobError};
pub use status::{time_difference_text, TierStatus};
pub use sync_manager::{
    JobRunRecord, JobRunStatus, SyncError, SyncManager, TierRunOutcome, TierRunReport,
    ENTRY_GUARD_WINDOW_SECS,
};
pub use tiers::{JobSlot, SyncTier};
