//! SQLite schema for the songs database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const SONGS_TABLE_V1: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("text", &SqlType::Text),
        sqlite_column!("artist", &SqlType::Text),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("created", &SqlType::Integer, non_null = true),
        sqlite_column!("play_count", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("last_played", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("score", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!("merge_song_id", &SqlType::Text),
    ],
    indices: &[
        ("idx_songs_search", "text, artist, title"),
        ("idx_songs_merge", "merge_song_id"),
    ],
    unique_constraints: &[],
};

const SONG_EXTERNAL_TABLE_V1: Table = Table {
    name: "song_external",
    columns: &[
        sqlite_column!("provider", &SqlType::Text, non_null = true),
        sqlite_column!("external_id", &SqlType::Text, non_null = true),
        sqlite_column!("song_id", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("web_url", &SqlType::Text),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_song_external_song", "song_id")],
    unique_constraints: &[&["provider", "external_id"]],
};

pub const SONG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[SONGS_TABLE_V1, SONG_EXTERNAL_TABLE_V1],
    migration: None,
}];
