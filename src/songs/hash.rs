use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Whatever a source tells us about a track.
///
/// Radio plays usually carry only `text`; catalogs usually carry `artist` and
/// `title`. The identity is derived from `text` when present, otherwise from
/// "artist - title".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDescription {
    pub text: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

impl SongDescription {
    pub fn from_artist_title(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Text the identity hash is computed from.
    pub fn identity_text(&self) -> String {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!(
                "{} - {}",
                self.artist.as_deref().unwrap_or_default(),
                self.title.as_deref().unwrap_or_default()
            ),
        }
    }
}

impl From<&str> for SongDescription {
    fn from(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }
}

impl From<String> for SongDescription {
    fn from(text: String) -> Self {
        Self {
            text: Some(text),
            ..Default::default()
        }
    }
}

impl From<&crate::nowplaying::CurrentSong> for SongDescription {
    fn from(song: &crate::nowplaying::CurrentSong) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            text: non_empty(&song.text),
            artist: non_empty(&song.artist),
            title: non_empty(&song.title),
            image_url: None,
        }
    }
}

/// Keep ASCII letters and digits, lowercased; everything else is noise.
pub fn normalize_song_text(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Stable identity of a track: hex MD5 of the normalized identity text.
///
/// The id is a primary key, so the output must never change across releases.
pub fn song_hash(description: &SongDescription) -> String {
    let normalized = normalize_song_text(&description.identity_text());
    let digest = Md5::digest(normalized.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash_value() {
        let id = song_hash(&"Daft Punk - One More Time".into());
        assert_eq!(id, "921be009b43e15e5662f7f5f6f121873");
        assert_eq!(id, song_hash(&"daftpunkonemoretime".into()));
    }

    #[test]
    fn test_empty_text_hashes_like_md5_of_empty_string() {
        let description = SongDescription {
            text: Some(String::new()),
            artist: Some(String::new()),
            title: Some(String::new()),
            image_url: None,
        };
        assert_eq!(song_hash(&description), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_punctuation_and_case_are_ignored() {
        let a = song_hash(&"Simon & Garfunkel - The Boxer".into());
        let b = song_hash(&"SIMON GARFUNKEL THE BOXER!!".into());
        assert_eq!(a, b);
    }

    #[test]
    fn test_structured_and_bare_descriptions_agree() {
        let structured = SongDescription::from_artist_title("Daft Punk", "One More Time");
        let bare: SongDescription = "Daft Punk - One More Time".into();
        assert_eq!(song_hash(&structured), song_hash(&bare));
    }

    #[test]
    fn test_text_takes_precedence_over_artist_title() {
        let description = SongDescription {
            text: Some("Something Else".to_string()),
            artist: Some("Daft Punk".to_string()),
            title: Some("One More Time".to_string()),
            image_url: None,
        };
        assert_eq!(
            song_hash(&description),
            song_hash(&"Something Else".into())
        );
    }

    #[test]
    fn test_different_songs_differ() {
        assert_ne!(
            song_hash(&"Daft Punk - One More Time".into()),
            song_hash(&"Daft Punk - Aerodynamic".into())
        );
    }
}
