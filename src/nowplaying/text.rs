//! Parsing helpers shared by stream adapters.

use super::snapshot::CurrentSong;

/// Marker some automation tools prepend to every title they broadcast.
const AUTODJ_MARKER: &str = "AutoDJ - ";

/// Shoutcast 2 sometimes replaces " - " with three spaces.
const TRIPLE_SPACE: &str = "   ";

const EDGE_TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '-'];

/// Choose one listener figure out of two counts of different precision.
///
/// Negative inputs are clamped to zero. Zero means "this metric is unknown", so if
/// either count is zero the other one wins. When both are known, the smaller one is
/// returned: duplicate-connection inflation is far more common than undercounting.
pub fn reconcile_listener_count(unique_listeners: i64, current_listeners: i64) -> u64 {
    let unique = unique_listeners.max(0) as u64;
    let current = current_listeners.max(0) as u64;

    if unique == 0 || current == 0 {
        unique.max(current)
    } else {
        unique.min(current)
    }
}

/// Lenient integer parse for listener figures found in remote payloads.
pub fn parse_count(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

/// Split a combined "Artist - Title" string.
///
/// The last delimited segment is the title and everything before it is the artist,
/// since artist names carry the delimiter far more often than titles do. A string
/// without the delimiter is all title.
pub fn split_artist_title(raw: &str, delimiter: &str) -> CurrentSong {
    let cleaned = raw.replace(AUTODJ_MARKER, "").replace(TRIPLE_SPACE, " - ");
    let cleaned = cleaned.trim_matches(EDGE_TRIM_CHARS).to_string();

    if delimiter.is_empty() || !cleaned.contains(delimiter) {
        return CurrentSong {
            text: cleaned.clone(),
            artist: String::new(),
            title: cleaned,
        };
    }

    let mut parts: Vec<&str> = cleaned.split(delimiter).collect();
    let title = parts.pop().unwrap_or_default().trim().to_string();
    let artist = parts.join(delimiter).trim().to_string();

    CurrentSong {
        text: cleaned,
        artist,
        title,
    }
}
