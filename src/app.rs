//! Wiring of stores, jobs and the sync manager from a resolved [`AppConfig`].

use crate::background_jobs::jobs::{
    CatalogSyncJob, NowPlayingJob, SongAliasIntegrityJob, SongHistoryCleanupJob, StaleSweepJob,
};
use crate::background_jobs::tiers::{EQBEATS_SYNC_JOB_ID, PONYFM_SYNC_JOB_ID};
use crate::background_jobs::{JobContext, SyncManager};
use crate::catalog_sync::{CatalogSync, EqBeats, PonyFm};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::fetcher::HttpFetcher;
use crate::nowplaying::AdapterRegistry;
use crate::settings_store::{SettingsStore, SqliteSettingsStore};
use crate::song_store::{SongStore, SqliteSongStore};
use crate::songs::SongResolver;
use crate::station_store::{SqliteStationStore, StationStore};
use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct App {
    pub config: AppConfig,
    pub settings: Arc<dyn SettingsStore>,
    pub station_store: Arc<dyn StationStore>,
    pub song_store: Arc<dyn SongStore>,
    pub clock: Arc<dyn Clock>,
}

impl App {
    /// Open (creating if needed) the three databases under `config.db_dir`.
    pub fn open(config: AppConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        info!("Opening databases in {:?}", config.db_dir);
        let settings = Arc::new(SqliteSettingsStore::new(config.server_db_path())?);
        let song_store = Arc::new(SqliteSongStore::new(config.songs_db_path())?);
        let station_store = Arc::new(SqliteStationStore::new(config.stations_db_path())?);
        Ok(Self {
            config,
            settings,
            station_store,
            song_store,
            clock,
        })
    }

    pub fn song_resolver(&self) -> SongResolver {
        SongResolver::new(Arc::clone(&self.song_store), Arc::clone(&self.clock))
    }

    /// A sync manager with every job the configuration enables.
    pub fn sync_manager(
        &self,
        fetcher: Arc<dyn HttpFetcher>,
        cancellation_token: CancellationToken,
    ) -> SyncManager {
        let context = JobContext::new(
            cancellation_token,
            Arc::clone(&self.station_store),
            self.song_resolver(),
            Arc::clone(&self.clock),
        );
        let mut manager = SyncManager::new(Arc::clone(&self.settings), context);

        let np = &self.config.nowplaying;
        manager.register_job(Arc::new(NowPlayingJob::new(
            AdapterRegistry::with_builtin_adapters(),
            Arc::clone(&fetcher),
            np.fetch_timeout,
            np.parallel_fetches,
        )));
        manager.register_job(Arc::new(StaleSweepJob::new(np.stale_after)));
        manager.register_job(Arc::new(SongAliasIntegrityJob));
        manager.register_job(Arc::new(SongHistoryCleanupJob::new(
            self.config.history_retention_days,
        )));

        let catalogs = &self.config.catalogs;
        if catalogs.ponyfm_enabled {
            manager.register_job(Arc::new(CatalogSyncJob::new(
                PONYFM_SYNC_JOB_ID,
                CatalogSync::new(
                    Arc::new(PonyFm::new(catalogs.ponyfm_base_url.clone())),
                    Arc::clone(&fetcher),
                    catalogs.timeout,
                ),
            )));
        }
        if catalogs.eqbeats_enabled {
            manager.register_job(Arc::new(CatalogSyncJob::new(
                EQBEATS_SYNC_JOB_ID,
                CatalogSync::new(
                    Arc::new(EqBeats::new(catalogs.eqbeats_base_url.clone())),
                    Arc::clone(&fetcher),
                    catalogs.timeout,
                ),
            )));
        }

        manager
    }
}
