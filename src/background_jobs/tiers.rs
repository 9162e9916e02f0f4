//! The four sync tiers and the fixed job order inside each.

use std::time::Duration;

/// A job position inside a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSlot {
    pub job_id: &'static str,
    pub name: &'static str,
}

pub const NOWPLAYING_JOB_ID: &str = "nowplaying";
pub const STALE_SWEEP_JOB_ID: &str = "nowplaying_stale_sweep";
pub const ALIAS_INTEGRITY_JOB_ID: &str = "song_alias_integrity";
pub const HISTORY_CLEANUP_JOB_ID: &str = "song_history_cleanup";
pub const PONYFM_SYNC_JOB_ID: &str = "catalog_sync_ponyfm";
pub const EQBEATS_SYNC_JOB_ID: &str = "catalog_sync_eqbeats";

const NOWPLAYING_SLOTS: &[JobSlot] = &[JobSlot {
    job_id: NOWPLAYING_JOB_ID,
    name: "Now Playing Data",
}];

const SHORT_SLOTS: &[JobSlot] = &[JobSlot {
    job_id: STALE_SWEEP_JOB_ID,
    name: "Stale Now Playing Sweep",
}];

const MEDIUM_SLOTS: &[JobSlot] = &[JobSlot {
    job_id: ALIAS_INTEGRITY_JOB_ID,
    name: "Song Alias Integrity",
}];

const LONG_SLOTS: &[JobSlot] = &[
    JobSlot {
        job_id: HISTORY_CLEANUP_JOB_ID,
        name: "Song History Cleanup",
    },
    JobSlot {
        job_id: PONYFM_SYNC_JOB_ID,
        name: "Pony.fm Sync",
    },
    JobSlot {
        job_id: EQBEATS_SYNC_JOB_ID,
        name: "EqBeats Sync",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SyncTier {
    #[value(name = "nowplaying")]
    NowPlaying,
    Short,
    Medium,
    Long,
}

impl SyncTier {
    pub const ALL: [SyncTier; 4] = [
        SyncTier::NowPlaying,
        SyncTier::Short,
        SyncTier::Medium,
        SyncTier::Long,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SyncTier::NowPlaying => "nowplaying",
            SyncTier::Short => "short",
            SyncTier::Medium => "medium",
            SyncTier::Long => "long",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyncTier::NowPlaying => "Now Playing Data",
            SyncTier::Short => "1-Minute Sync",
            SyncTier::Medium => "5-Minute Sync",
            SyncTier::Long => "1-Hour Sync",
        }
    }

    /// Minimum time between two runs of this tier.
    pub fn interval(&self) -> Duration {
        match self {
            SyncTier::NowPlaying | SyncTier::Short => Duration::from_secs(60),
            SyncTier::Medium => Duration::from_secs(300),
            SyncTier::Long => Duration::from_secs(1800),
        }
    }

    /// Only the now-playing tier refuses to start while a previous run looks in flight.
    pub fn has_entry_guard(&self) -> bool {
        matches!(self, SyncTier::NowPlaying)
    }

    /// Settings key holding the time the last run started.
    pub fn started_key(&self) -> &'static str {
        match self {
            SyncTier::NowPlaying => "nowplaying_last_started",
            SyncTier::Short => "sync_fast_last_started",
            SyncTier::Medium => "sync_last_started",
            SyncTier::Long => "sync_slow_last_started",
        }
    }

    /// Settings key holding the time the last run completed.
    pub fn last_run_key(&self) -> &'static str {
        match self {
            SyncTier::NowPlaying => "nowplaying_last_run",
            SyncTier::Short => "sync_fast_last_run",
            SyncTier::Medium => "sync_last_run",
            SyncTier::Long => "sync_slow_last_run",
        }
    }

    pub fn job_slots(&self) -> &'static [JobSlot] {
        match self {
            SyncTier::NowPlaying => NOWPLAYING_SLOTS,
            SyncTier::Short => SHORT_SLOTS,
            SyncTier::Medium => MEDIUM_SLOTS,
            SyncTier::Long => LONG_SLOTS,
        }
    }
}

impl std::fmt::Display for SyncTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
