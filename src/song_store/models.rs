use crate::clock::UnixTimestamp;
use serde::{Deserialize, Serialize};

/// A deduplicated track identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Hash of the normalized song text; see [`crate::songs::song_hash`].
    pub id: String,
    pub text: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub created: UnixTimestamp,
    pub play_count: i64,
    pub last_played: UnixTimestamp,
    pub score: i64,
    /// Canonical record this one was merged into, if any.
    pub merge_song_id: Option<String>,
}

impl Song {
    pub fn api(&self) -> SongApi {
        SongApi {
            id: self.id.clone(),
            text: self.text.clone(),
            artist: self.artist.clone(),
            title: self.title.clone(),
        }
    }
}

/// Public view of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongApi {
    pub id: String,
    pub text: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
}

/// A track row as mirrored from an external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSong {
    pub provider: String,
    pub external_id: String,
    pub song_id: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub web_url: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: UnixTimestamp,
}
