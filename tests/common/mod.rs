//! Common test infrastructure
//!
//! End-to-end tests open a real [`App`] over a temporary directory, drive it
//! with a [`ManualClock`] and answer every HTTP request from a [`ScriptedFetcher`].
//!
//! ```no_run
//! mod common;
//! use common::TestApp;
//!
//! let app = TestApp::new();
//! app.fetcher.set_body("http://radio.test/np", "Artist - Title");
//! ```

mod constants;
mod fetcher;

pub use constants::*;
pub use fetcher::ScriptedFetcher;

use radio_sync_server::clock::ManualClock;
use radio_sync_server::config::{AppConfig, CatalogsConfig, CliConfig, FileConfig};
use radio_sync_server::station_store::{NewStation, NewStationStream, StationStream};
use radio_sync_server::{App, SyncManager};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub struct TestApp {
    pub app: App,
    pub clock: Arc<ManualClock>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub manager: SyncManager,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let file_config = FileConfig {
            catalogs: Some(CatalogsConfig {
                ponyfm_base_url: Some(PONYFM_BASE_URL.to_string()),
                eqbeats_enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(file_config)).expect("Failed to resolve config");

        let clock = Arc::new(ManualClock::new(START_TIME));
        let app = App::open_with_clock(config, clock.clone()).expect("Failed to open app");
        let fetcher = Arc::new(ScriptedFetcher::default());
        let manager = app.sync_manager(fetcher.clone(), CancellationToken::new());

        Self {
            app,
            clock,
            fetcher,
            manager,
            _temp_dir: temp_dir,
        }
    }

    /// A station with one active `text` stream polled at [`NOWPLAYING_URL`].
    pub fn add_text_station(&self) -> StationStream {
        let station = self
            .app
            .station_store
            .add_station(&NewStation {
                name: STATION_NAME.to_string(),
                short_name: None,
            })
            .expect("Failed to add station");
        self.app
            .station_store
            .add_stream(&NewStationStream {
                station_id: station.id,
                name: "Main".to_string(),
                stream_url: "http://radio.test/stream".to_string(),
                nowplaying_url: Some(NOWPLAYING_URL.to_string()),
                source_type: "text".to_string(),
                is_default: true,
            })
            .expect("Failed to add stream")
    }
}
