use super::models::{
    NewSongHistoryEntry, NewStation, NewStationStream, SongHistoryEntry, Station, StationStream,
    StationWithStreams, StoredNowPlaying,
};
use super::schema::STATION_VERSIONED_SCHEMAS;
use super::StationStore;
use crate::clock::UnixTimestamp;
use crate::nowplaying::{NowPlaying, OFFLINE_SONG_TEXT};
use crate::sqlite_persistence::open_versioned_db;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

pub struct SqliteStationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStationStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), STATION_VERSIONED_SCHEMAS, "stations")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_station(row: &rusqlite::Row) -> rusqlite::Result<Station> {
        Ok(Station {
            id: row.get("id")?,
            name: row.get("name")?,
            short_name: row.get("short_name")?,
            is_active: row.get("is_active")?,
        })
    }

    fn row_to_stream(row: &rusqlite::Row) -> rusqlite::Result<StationStream> {
        Ok(StationStream {
            id: row.get("id")?,
            station_id: row.get("station_id")?,
            name: row.get("name")?,
            stream_url: row.get("stream_url")?,
            nowplaying_url: row.get("nowplaying_url")?,
            source_type: row.get("source_type")?,
            is_active: row.get("is_active")?,
            is_default: row.get("is_default")?,
        })
    }

    fn row_to_history(row: &rusqlite::Row) -> rusqlite::Result<SongHistoryEntry> {
        Ok(SongHistoryEntry {
            id: row.get("id")?,
            station_id: row.get("station_id")?,
            stream_id: row.get("stream_id")?,
            song_id: row.get("song_id")?,
            timestamp: row.get("timestamp")?,
            listeners: row.get::<_, i64>("listeners")?.max(0) as u64,
        })
    }

    /// Rows whose payload no longer deserializes are reported as offline.
    fn decode_nowplaying(
        stream_id: i64,
        payload: &str,
        updated_at: UnixTimestamp,
    ) -> StoredNowPlaying {
        let nowplaying = serde_json::from_str(payload).unwrap_or_else(|e| {
            warn!("Unreadable snapshot for stream {}: {}", stream_id, e);
            NowPlaying::offline()
        });
        StoredNowPlaying {
            stream_id,
            nowplaying,
            updated_at,
        }
    }
}

impl StationStore for SqliteStationStore {
    fn add_station(&self, station: &NewStation) -> Result<Station> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO stations (name, short_name, is_active) VALUES (?1, ?2, 1)",
            params![station.name, station.short_name],
        )
        .with_context(|| format!("Failed to add station {}", station.name))?;
        Ok(Station {
            id: conn.last_insert_rowid(),
            name: station.name.clone(),
            short_name: station.short_name.clone(),
            is_active: true,
        })
    }

    fn add_stream(&self, stream: &NewStationStream) -> Result<StationStream> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO station_streams
             (station_id, name, stream_url, nowplaying_url, source_type, is_active, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                stream.station_id,
                stream.name,
                stream.stream_url,
                stream.nowplaying_url,
                stream.source_type,
                stream.is_default,
            ],
        )
        .with_context(|| {
            format!(
                "Failed to add stream {} to station {}",
                stream.name, stream.station_id
            )
        })?;
        Ok(StationStream {
            id: conn.last_insert_rowid(),
            station_id: stream.station_id,
            name: stream.name.clone(),
            stream_url: stream.stream_url.clone(),
            nowplaying_url: stream.nowplaying_url.clone(),
            source_type: stream.source_type.clone(),
            is_active: true,
            is_default: stream.is_default,
        })
    }

    fn set_station_active(&self, station_id: i64, is_active: bool) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE stations SET is_active = ?2 WHERE id = ?1",
            params![station_id, is_active],
        )?;
        Ok(updated > 0)
    }

    fn set_stream_active(&self, stream_id: i64, is_active: bool) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE station_streams SET is_active = ?2 WHERE id = ?1",
            params![stream_id, is_active],
        )?;
        Ok(updated > 0)
    }

    fn list_stations_with_streams(&self) -> Result<Vec<StationWithStreams>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare("SELECT * FROM station_streams ORDER BY station_id, is_default DESC, id")?;
        let mut streams_by_station: HashMap<i64, Vec<StationStream>> = HashMap::new();
        for stream in stmt.query_map([], Self::row_to_stream)? {
            let stream = stream?;
            streams_by_station
                .entry(stream.station_id)
                .or_default()
                .push(stream);
        }

        let mut stmt = conn.prepare("SELECT * FROM stations ORDER BY id")?;
        let stations = stmt
            .query_map([], Self::row_to_station)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(stations
            .into_iter()
            .map(|station| StationWithStreams {
                streams: streams_by_station.remove(&station.id).unwrap_or_default(),
                station,
            })
            .collect())
    }

    fn save_nowplaying(
        &self,
        stream_id: i64,
        nowplaying: &NowPlaying,
        updated_at: UnixTimestamp,
    ) -> Result<()> {
        let payload = serde_json::to_string(nowplaying)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO stream_nowplaying (stream_id, payload, status, song_text, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(stream_id) DO UPDATE SET
                payload = ?2, status = ?3, song_text = ?4, updated_at = ?5",
            params![
                stream_id,
                payload,
                nowplaying.meta.status.as_str(),
                nowplaying.current_song.text,
                updated_at,
            ],
        )
        .with_context(|| format!("Failed to save snapshot for stream {}", stream_id))?;
        Ok(())
    }

    fn get_nowplaying(&self, stream_id: i64) -> Result<Option<StoredNowPlaying>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT payload, updated_at FROM stream_nowplaying WHERE stream_id = ?1",
                params![stream_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(payload, updated_at)| Self::decode_nowplaying(stream_id, &payload, updated_at)))
    }

    fn list_nowplaying(&self) -> Result<Vec<StoredNowPlaying>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT stream_id, payload, updated_at FROM stream_nowplaying ORDER BY stream_id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(|(stream_id, payload, updated_at)| {
                Self::decode_nowplaying(stream_id, &payload, updated_at)
            })
            .collect())
    }

    fn mark_stale_offline(&self, older_than: UnixTimestamp) -> Result<usize> {
        let offline = NowPlaying::offline();
        let payload = serde_json::to_string(&offline)?;
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE stream_nowplaying SET payload = ?1, status = ?2, song_text = ?3
             WHERE updated_at < ?4 AND status != ?2",
            params![payload, offline.meta.status.as_str(), OFFLINE_SONG_TEXT, older_than],
        )?;
        Ok(updated)
    }

    fn record_song_history(&self, entry: &NewSongHistoryEntry) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO song_history (station_id, stream_id, song_id, timestamp, listeners)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.station_id,
                entry.stream_id,
                entry.song_id,
                entry.timestamp,
                entry.listeners as i64,
            ],
        )
        .with_context(|| format!("Failed to record history for stream {}", entry.stream_id))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_song_history(&self, stream_id: i64, limit: usize) -> Result<Vec<SongHistoryEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT * FROM song_history WHERE stream_id = ?1
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![stream_id, limit as i64], Self::row_to_history)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn delete_song_history_before(&self, cutoff: UnixTimestamp) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM song_history WHERE timestamp < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }
}
