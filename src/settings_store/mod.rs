//! Persistent key/value settings.
//!
//! The sync scheduler keeps its tier watermarks here; values are stored as
//! strings and must survive process restarts.

mod schema;
mod sqlite_settings_store;

pub use schema::SETTINGS_VERSIONED_SCHEMAS;
pub use sqlite_settings_store::SqliteSettingsStore;

use anyhow::Result;
use tracing::warn;

pub trait SettingsStore: Send + Sync {
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
    fn delete_setting(&self, key: &str) -> Result<()>;
}

/// Read an integer setting, falling back to `default` when the key is missing.
///
/// A value that does not parse is logged and treated as missing.
pub fn get_i64_setting(store: &dyn SettingsStore, key: &str, default: i64) -> Result<i64> {
    match store.get_setting(key)? {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!("Setting {} has non-numeric value {:?}, using {}", key, raw, default);
                Ok(default)
            }
        },
        None => Ok(default),
    }
}

pub fn set_i64_setting(store: &dyn SettingsStore, key: &str, value: i64) -> Result<()> {
    store.set_setting(key, &value.to_string())
}
