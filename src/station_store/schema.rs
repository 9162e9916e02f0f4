//! SQLite schema for the stations database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, SqlType, Table, VersionedSchema};

const STATIONS_FK: ForeignKey = ForeignKey {
    foreign_table: "stations",
    foreign_column: "id",
};

const STREAMS_FK: ForeignKey = ForeignKey {
    foreign_table: "station_streams",
    foreign_column: "id",
};

const STATIONS_TABLE_V1: Table = Table {
    name: "stations",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("short_name", &SqlType::Text),
        sqlite_column!("is_active", &SqlType::Integer, non_null = true, default_value = Some("1")),
    ],
    indices: &[],
    unique_constraints: &[],
};

const STATION_STREAMS_TABLE_V1: Table = Table {
    name: "station_streams",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "station_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&STATIONS_FK)
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("stream_url", &SqlType::Text, non_null = true),
        sqlite_column!("nowplaying_url", &SqlType::Text),
        sqlite_column!("source_type", &SqlType::Text, non_null = true),
        sqlite_column!("is_active", &SqlType::Integer, non_null = true, default_value = Some("1")),
        sqlite_column!("is_default", &SqlType::Integer, non_null = true, default_value = Some("0")),
    ],
    indices: &[("idx_station_streams_station", "station_id")],
    unique_constraints: &[],
};

/// Current snapshot per stream; overwritten on every poll.
const STREAM_NOWPLAYING_TABLE_V1: Table = Table {
    name: "stream_nowplaying",
    columns: &[
        sqlite_column!(
            "stream_id",
            &SqlType::Integer,
            is_primary_key = true,
            foreign_key = Some(&STREAMS_FK)
        ),
        sqlite_column!("payload", &SqlType::Text, non_null = true),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        sqlite_column!("song_text", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_stream_nowplaying_updated", "updated_at")],
    unique_constraints: &[],
};

const SONG_HISTORY_TABLE_V1: Table = Table {
    name: "song_history",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("station_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "stream_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&STREAMS_FK)
        ),
        sqlite_column!("song_id", &SqlType::Text, non_null = true),
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true),
        sqlite_column!("listeners", &SqlType::Integer, non_null = true, default_value = Some("0")),
    ],
    indices: &[
        ("idx_song_history_timestamp", "timestamp"),
        ("idx_song_history_stream", "stream_id, timestamp"),
    ],
    unique_constraints: &[],
};

pub const STATION_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        STATIONS_TABLE_V1,
        STATION_STREAMS_TABLE_V1,
        STREAM_NOWPLAYING_TABLE_V1,
        SONG_HISTORY_TABLE_V1,
    ],
    migration: None,
}];
