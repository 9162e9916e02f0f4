//! Stations, their streams, the current snapshot of each stream and the
//! per-station song history.

mod models;
mod schema;
mod sqlite_station_store;

pub use models::*;
pub use schema::STATION_VERSIONED_SCHEMAS;
pub use sqlite_station_store::SqliteStationStore;

use crate::clock::UnixTimestamp;
use crate::nowplaying::NowPlaying;
use anyhow::Result;

pub trait StationStore: Send + Sync {
    fn add_station(&self, station: &NewStation) -> Result<Station>;

    /// Fails if the parent station does not exist.
    fn add_stream(&self, stream: &NewStationStream) -> Result<StationStream>;

    /// Returns false when no station has this id.
    fn set_station_active(&self, station_id: i64, is_active: bool) -> Result<bool>;

    /// Returns false when no stream has this id.
    fn set_stream_active(&self, stream_id: i64, is_active: bool) -> Result<bool>;

    /// Every station, ordered by id, with its streams (default stream first).
    fn list_stations_with_streams(&self) -> Result<Vec<StationWithStreams>>;

    /// Replace the current snapshot of a stream.
    fn save_nowplaying(
        &self,
        stream_id: i64,
        nowplaying: &NowPlaying,
        updated_at: UnixTimestamp,
    ) -> Result<()>;

    fn get_nowplaying(&self, stream_id: i64) -> Result<Option<StoredNowPlaying>>;

    fn list_nowplaying(&self) -> Result<Vec<StoredNowPlaying>>;

    /// Rewrite online snapshots last refreshed before `older_than` to the
    /// offline snapshot. Returns the number of rewritten streams.
    fn mark_stale_offline(&self, older_than: UnixTimestamp) -> Result<usize>;

    fn record_song_history(&self, entry: &NewSongHistoryEntry) -> Result<i64>;

    /// Most recent history rows of one stream, newest first.
    fn get_song_history(&self, stream_id: i64, limit: usize) -> Result<Vec<SongHistoryEntry>>;

    fn delete_song_history_before(&self, cutoff: UnixTimestamp) -> Result<usize>;
}
