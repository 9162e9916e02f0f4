//! Specific sync job implementations.

pub mod catalog_sync;
pub mod nowplaying;
pub mod song_alias_integrity;
pub mod song_history_cleanup;
pub mod stale_sweep;

pub use catalog_sync::CatalogSyncJob;
pub use nowplaying::NowPlayingJob;
pub use song_alias_integrity::SongAliasIntegrityJob;
pub use song_history_cleanup::SongHistoryCleanupJob;
pub use stale_sweep::StaleSweepJob;
