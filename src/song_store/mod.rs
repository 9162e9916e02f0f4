//! Storage of song identities and their external catalog mirrors.

mod models;
mod schema;
mod sqlite_song_store;

pub use models::*;
pub use schema::SONG_VERSIONED_SCHEMAS;
pub use sqlite_song_store::SqliteSongStore;

use crate::clock::UnixTimestamp;
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// Entity store for [`Song`] rows.
///
/// Individual writes are atomic; `upsert_external_songs` writes its whole batch
/// in one transaction so a catalog page is either fully stored or not at all.
pub trait SongStore: Send + Sync {
    fn get_song(&self, id: &str) -> Result<Option<Song>>;

    /// Insert `song` unless a row with the same id exists. Returns whether it was inserted.
    fn insert_song_if_absent(&self, song: &Song) -> Result<bool>;

    /// Atomically bump the play counter and stamp the last play time.
    fn record_play(&self, id: &str, played_at: UnixTimestamp) -> Result<()>;

    /// Point `id` at `target` (or clear the alias). Returns false if `id` does not exist.
    fn set_merge_target(&self, id: &str, target: Option<&str>) -> Result<bool>;

    fn get_song_ids(&self) -> Result<HashSet<String>>;

    /// `(id, merge_song_id)` for every aliased song.
    fn get_aliased_songs(&self) -> Result<Vec<(String, String)>>;

    fn count_songs(&self) -> Result<usize>;

    /// external_id -> song_id for one provider.
    fn get_external_song_ids(&self, provider: &str) -> Result<HashMap<String, String>>;

    fn upsert_external_songs(&self, songs: &[ExternalSong]) -> Result<usize>;
}
