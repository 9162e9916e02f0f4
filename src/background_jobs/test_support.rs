use super::context::JobContext;
use crate::clock::ManualClock;
use crate::settings_store::SqliteSettingsStore;
use crate::song_store::SqliteSongStore;
use crate::songs::SongResolver;
use crate::station_store::SqliteStationStore;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const TEST_NOW: i64 = 1_000_000;

/// Real SQLite stores in a temp dir plus a manual clock set to [`TEST_NOW`].
pub struct TestEnv {
    pub ctx: JobContext,
    pub clock: Arc<ManualClock>,
    pub settings: Arc<SqliteSettingsStore>,
    pub station_store: Arc<SqliteStationStore>,
    pub song_store: Arc<SqliteSongStore>,
    pub _temp_dir: TempDir,
}

pub fn test_env() -> TestEnv {
    let temp_dir = TempDir::new().unwrap();
    let settings = Arc::new(SqliteSettingsStore::new(temp_dir.path().join("server.db")).unwrap());
    let station_store =
        Arc::new(SqliteStationStore::new(temp_dir.path().join("stations.db")).unwrap());
    let song_store = Arc::new(SqliteSongStore::new(temp_dir.path().join("songs.db")).unwrap());
    let clock = Arc::new(ManualClock::new(TEST_NOW));

    let ctx = JobContext::new(
        CancellationToken::new(),
        station_store.clone(),
        SongResolver::new(song_store.clone(), clock.clone()),
        clock.clone(),
    );

    TestEnv {
        ctx,
        clock,
        settings,
        station_store,
        song_store,
        _temp_dir: temp_dir,
    }
}
