use serde::{Deserialize, Serialize};

/// Song text used for a stream that is not (or cannot be) reporting anything.
pub const OFFLINE_SONG_TEXT: &str = "Stream Offline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSong {
    pub text: String,
    pub title: String,
    pub artist: String,
}

impl CurrentSong {
    pub fn is_offline(&self) -> bool {
        self.text == OFFLINE_SONG_TEXT
    }
}

impl Default for CurrentSong {
    fn default() -> Self {
        Self {
            text: OFFLINE_SONG_TEXT.to_string(),
            title: String::new(),
            artist: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Online,
    Offline,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Online => "online",
            StreamStatus::Offline => "offline",
        }
    }
}

/// Listener counts as an adapter reports them; `None` means the source did not say.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftListeners {
    pub current: u64,
    pub unique: Option<u64>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftMeta {
    pub bitrate: u32,
    pub format: String,
}

/// The mutable snapshot handed to a stream adapter while it merges remote data.
///
/// There is deliberately no status field here: liveness is derived from the
/// song text when the draft is finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlayingDraft {
    pub current_song: CurrentSong,
    pub listeners: DraftListeners,
    pub meta: DraftMeta,
}

impl NowPlayingDraft {
    /// Turn the draft into the canonical snapshot.
    ///
    /// Offline drafts keep their strings untouched; online drafts get HTML entities
    /// decoded and every song field trimmed. Unknown listener figures are backfilled
    /// from the current count.
    pub fn finalize(self) -> NowPlaying {
        let NowPlayingDraft {
            mut current_song,
            listeners,
            meta,
        } = self;

        if !current_song.is_offline() {
            current_song.text = clean_up_string(&current_song.text);
            current_song.title = clean_up_string(&current_song.title);
            current_song.artist = clean_up_string(&current_song.artist);
        }
        // Cleanup can itself produce the sentinel, so status is read afterwards.
        let status = if current_song.is_offline() {
            StreamStatus::Offline
        } else {
            StreamStatus::Online
        };

        NowPlaying {
            current_song,
            listeners: Listeners {
                current: listeners.current,
                unique: listeners.unique.unwrap_or(listeners.current),
                total: listeners.total.unwrap_or(listeners.current),
            },
            meta: Meta {
                status,
                bitrate: meta.bitrate,
                format: meta.format,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listeners {
    pub current: u64,
    pub unique: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub status: StreamStatus,
    pub bitrate: u32,
    pub format: String,
}

/// Finalized now-playing state for one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub current_song: CurrentSong,
    pub listeners: Listeners,
    pub meta: Meta,
}

impl NowPlaying {
    /// The snapshot of a stream that is inactive or could not be reached.
    pub fn offline() -> Self {
        NowPlayingDraft::default().finalize()
    }

    pub fn is_online(&self) -> bool {
        self.meta.status == StreamStatus::Online
    }
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self::offline()
    }
}

fn clean_up_string(value: &str) -> String {
    html_escape::decode_html_entities(value).trim().to_string()
}
