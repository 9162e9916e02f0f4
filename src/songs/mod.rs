//! Song identity: content hashing and alias-aware resolution.

mod hash;
mod resolver;

pub use hash::{normalize_song_text, song_hash, SongDescription};
pub use resolver::{SongError, SongResolver};
