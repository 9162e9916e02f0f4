//! Radio Sync Server Library
//!
//! Now-playing ingestion from radio stream backends, song identity
//! deduplication across radio plays and external catalogs, and the tiered
//! scheduler that drives both.

pub mod app;
pub mod background_jobs;
pub mod catalog_sync;
pub mod clock;
pub mod config;
pub mod fetcher;
pub mod nowplaying;
pub mod settings_store;
pub mod song_store;
pub mod songs;
pub mod sqlite_persistence;
pub mod station_store;

// Re-export commonly used types for convenience
pub use app::App;
pub use background_jobs::{SyncManager, SyncTier};
pub use settings_store::{SettingsStore, SqliteSettingsStore};
pub use song_store::{SongStore, SqliteSongStore};
pub use station_store::{SqliteStationStore, StationStore};
