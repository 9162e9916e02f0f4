use super::models::{ExternalSong, Song};
use super::schema::SONG_VERSIONED_SCHEMAS;
use super::SongStore;
use crate::clock::UnixTimestamp;
use crate::sqlite_persistence::open_versioned_db;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct SqliteSongStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSongStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), SONG_VERSIONED_SCHEMAS, "songs")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_song(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get("id")?,
            text: row.get("text")?,
            artist: row.get("artist")?,
            title: row.get("title")?,
            image_url: row.get("image_url")?,
            created: row.get("created")?,
            play_count: row.get("play_count")?,
            last_played: row.get("last_played")?,
            score: row.get("score")?,
            merge_song_id: row.get("merge_song_id")?,
        })
    }
}

impl SongStore for SqliteSongStore {
    fn get_song(&self, id: &str) -> Result<Option<Song>> {
        let conn = self.conn.lock().unwrap();
        let song = conn
            .query_row(
                "SELECT * FROM songs WHERE id = ?1",
                params![id],
                Self::row_to_song,
            )
            .optional()?;
        Ok(song)
    }

    fn insert_song_if_absent(&self, song: &Song) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO songs
                 (id, text, artist, title, image_url, created, play_count, last_played, score, merge_song_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    song.id,
                    song.text,
                    song.artist,
                    song.title,
                    song.image_url,
                    song.created,
                    song.play_count,
                    song.last_played,
                    song.score,
                    song.merge_song_id,
                ],
            )
            .with_context(|| format!("Failed to insert song {}", song.id))?;
        Ok(inserted > 0)
    }

    fn record_play(&self, id: &str, played_at: UnixTimestamp) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE songs SET play_count = play_count + 1, last_played = ?2 WHERE id = ?1",
            params![id, played_at],
        )?;
        if updated == 0 {
            anyhow::bail!("Cannot record play for unknown song {}", id);
        }
        Ok(())
    }

    fn set_merge_target(&self, id: &str, target: Option<&str>) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE songs SET merge_song_id = ?2 WHERE id = ?1",
            params![id, target],
        )?;
        Ok(updated > 0)
    }

    fn get_song_ids(&self) -> Result<HashSet<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM songs")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(ids)
    }

    fn get_aliased_songs(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, merge_song_id FROM songs WHERE merge_song_id IS NOT NULL ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn count_songs(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn get_external_song_ids(&self, provider: &str) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT external_id, song_id FROM song_external WHERE provider = ?1")?;
        let rows = stmt
            .query_map(params![provider], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
    }

    fn upsert_external_songs(&self, songs: &[ExternalSong]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO song_external
                 (provider, external_id, song_id, artist, title, web_url, image_url, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(provider, external_id) DO UPDATE SET
                    song_id = ?3, artist = ?4, title = ?5, web_url = ?6, image_url = ?7, updated_at = ?8",
            )?;
            for song in songs {
                stmt.execute(params![
                    song.provider,
                    song.external_id,
                    song.song_id,
                    song.artist,
                    song.title,
                    song.web_url,
                    song.image_url,
                    song.updated_at,
                ])?;
            }
        }
        tx.commit().context("Failed to commit external songs batch")?;
        Ok(songs.len())
    }
}
