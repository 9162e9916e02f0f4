mod file_config;

pub use file_config::{CatalogsConfig, FileConfig, NowPlayingConfig, SongHistoryConfig};

use crate::catalog_sync::{EQBEATS_DEFAULT_BASE_URL, PONYFM_DEFAULT_BASE_URL};
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub history_retention_days: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            fetch_timeout_secs: 4,
            history_retention_days: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub nowplaying: NowPlayingSettings,
    pub history_retention_days: u64,
    pub catalogs: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingSettings {
    pub fetch_timeout: Duration,
    pub parallel_fetches: bool,
    pub stale_after: Duration,
}

impl Default for NowPlayingSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(4),
            parallel_fetches: true,
            stale_after: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub timeout: Duration,
    pub ponyfm_enabled: bool,
    pub ponyfm_base_url: String,
    pub eqbeats_enabled: bool,
    pub eqbeats_base_url: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            ponyfm_enabled: true,
            ponyfm_base_url: PONYFM_DEFAULT_BASE_URL.to_string(),
            eqbeats_enabled: true,
            eqbeats_base_url: EQBEATS_DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let np_file = file.nowplaying.unwrap_or_default();
        let np_defaults = NowPlayingSettings::default();
        let fetch_timeout_secs = np_file.fetch_timeout_secs.unwrap_or(cli.fetch_timeout_secs);
        if fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be at least 1");
        }
        if np_file.stale_after_secs == Some(0) {
            bail!("stale_after_secs must be at least 1");
        }
        let nowplaying = NowPlayingSettings {
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            parallel_fetches: np_file
                .parallel_fetches
                .unwrap_or(np_defaults.parallel_fetches),
            stale_after: np_file
                .stale_after_secs
                .map(Duration::from_secs)
                .unwrap_or(np_defaults.stale_after),
        };

        let history_retention_days = file
            .song_history
            .and_then(|h| h.retention_days)
            .unwrap_or(cli.history_retention_days);

        let cat_file = file.catalogs.unwrap_or_default();
        let cat_defaults = CatalogSettings::default();
        if cat_file.timeout_secs == Some(0) {
            bail!("catalogs timeout_secs must be at least 1");
        }
        let catalogs = CatalogSettings {
            timeout: cat_file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(cat_defaults.timeout),
            ponyfm_enabled: cat_file.ponyfm_enabled.unwrap_or(cat_defaults.ponyfm_enabled),
            ponyfm_base_url: cat_file
                .ponyfm_base_url
                .unwrap_or(cat_defaults.ponyfm_base_url),
            eqbeats_enabled: cat_file
                .eqbeats_enabled
                .unwrap_or(cat_defaults.eqbeats_enabled),
            eqbeats_base_url: cat_file
                .eqbeats_base_url
                .unwrap_or(cat_defaults.eqbeats_base_url),
        };

        Ok(AppConfig {
            db_dir,
            nowplaying,
            history_retention_days,
            catalogs,
        })
    }

    pub fn server_db_path(&self) -> PathBuf {
        self.db_dir.join("server.db")
    }

    pub fn songs_db_path(&self) -> PathBuf {
        self.db_dir.join("songs.db")
    }

    pub fn stations_db_path(&self) -> PathBuf {
        self.db_dir.join("stations.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_temp_db_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            fetch_timeout_secs: 8,
            history_retention_days: 14,
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.nowplaying.fetch_timeout, Duration::from_secs(8));
        assert!(config.nowplaying.parallel_fetches);
        assert_eq!(config.nowplaying.stale_after, Duration::from_secs(300));
        assert_eq!(config.history_retention_days, 14);
        assert_eq!(config.catalogs, CatalogSettings::default());
        assert_eq!(config.songs_db_path(), temp_dir.path().join("songs.db"));
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            ..Default::default()
        };

        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            nowplaying: Some(NowPlayingConfig {
                fetch_timeout_secs: Some(2),
                parallel_fetches: Some(false),
                stale_after_secs: None,
            }),
            song_history: None,
            catalogs: Some(CatalogsConfig {
                eqbeats_enabled: Some(false),
                ..Default::default()
            }),
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.nowplaying.fetch_timeout, Duration::from_secs(2));
        assert!(!config.nowplaying.parallel_fetches);
        assert!(!config.catalogs.eqbeats_enabled);
        // CLI or default used when TOML doesn't specify
        assert_eq!(config.history_retention_days, 30);
        assert!(config.catalogs.ponyfm_enabled);
    }

    #[test]
    fn test_resolve_missing_db_dir_error() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/12345")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_dir_not_directory_error() {
        let temp_dir = make_temp_db_dir();
        let file_path = temp_dir.path().join("not_a_dir");
        std::fs::write(&file_path, "").unwrap();
        let cli = CliConfig {
            db_dir: Some(file_path),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_zero_fetch_timeout_rejected() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            fetch_timeout_secs: 0,
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_zero_stale_window_and_catalog_timeout_rejected() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let zero_stale = FileConfig {
            nowplaying: Some(NowPlayingConfig {
                stale_after_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, Some(zero_stale)).unwrap_err();
        assert!(err.to_string().contains("stale_after_secs"));

        let zero_catalog_timeout = FileConfig {
            catalogs: Some(CatalogsConfig {
                timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, Some(zero_catalog_timeout)).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));

        let valid = FileConfig {
            nowplaying: Some(NowPlayingConfig {
                stale_after_secs: Some(1),
                ..Default::default()
            }),
            catalogs: Some(CatalogsConfig {
                timeout_secs: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(valid)).unwrap();
        assert_eq!(config.nowplaying.stale_after, Duration::from_secs(1));
        assert_eq!(config.catalogs.timeout, Duration::from_secs(1));
    }
}
