use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,

    // Feature configs
    pub nowplaying: Option<NowPlayingConfig>,
    pub song_history: Option<SongHistoryConfig>,
    pub catalogs: Option<CatalogsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct NowPlayingConfig {
    pub fetch_timeout_secs: Option<u64>,
    pub parallel_fetches: Option<bool>,
    pub stale_after_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SongHistoryConfig {
    pub retention_days: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CatalogsConfig {
    pub timeout_secs: Option<u64>,
    pub ponyfm_enabled: Option<bool>,
    pub ponyfm_base_url: Option<String>,
    pub eqbeats_enabled: Option<bool>,
    pub eqbeats_base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
