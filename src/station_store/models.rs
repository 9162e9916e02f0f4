use crate::clock::UnixTimestamp;
use crate::nowplaying::NowPlaying;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub short_name: Option<String>,
    pub is_active: bool,
}

/// One broadcast stream of a station, polled by the adapter registered for
/// its `source_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationStream {
    pub id: i64,
    pub station_id: i64,
    pub name: String,
    pub stream_url: String,
    /// Status endpoint, when the vendor exposes one separately from the audio URL.
    pub nowplaying_url: Option<String>,
    pub source_type: String,
    pub is_active: bool,
    pub is_default: bool,
}

impl StationStream {
    /// URL adapters poll unless a fetch overrides it.
    pub fn status_url(&self) -> &str {
        match self.nowplaying_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => &self.stream_url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStation {
    pub name: String,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStationStream {
    pub station_id: i64,
    pub name: String,
    pub stream_url: String,
    pub nowplaying_url: Option<String>,
    pub source_type: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct StationWithStreams {
    pub station: Station,
    pub streams: Vec<StationStream>,
}

/// Latest snapshot stored for a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredNowPlaying {
    pub stream_id: i64,
    pub nowplaying: NowPlaying,
    pub updated_at: UnixTimestamp,
}

#[derive(Debug, Clone)]
pub struct NewSongHistoryEntry {
    pub station_id: i64,
    pub stream_id: i64,
    pub song_id: String,
    pub timestamp: UnixTimestamp,
    pub listeners: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongHistoryEntry {
    pub id: i64,
    pub station_id: i64,
    pub stream_id: i64,
    pub song_id: String,
    pub timestamp: UnixTimestamp,
    pub listeners: u64,
}
