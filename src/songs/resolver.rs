use super::hash::{song_hash, SongDescription};
use crate::clock::Clock;
use crate::nowplaying::split_artist_title;
use crate::song_store::{Song, SongStore};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SongError {
    #[error("alias chain starting at {id} does not terminate: {}", chain.join(" -> "))]
    IdentityCycle { id: String, chain: Vec<String> },

    #[error("song {id} exists but its alias chain ends without a record")]
    BrokenAlias { id: String },

    #[error("unknown song {id}")]
    UnknownSong { id: String },

    #[error("song store failure: {0}")]
    Store(#[from] anyhow::Error),
}

/// Maps track descriptions onto canonical [`Song`] records.
///
/// Safe to share between jobs: creation goes through an insert-if-absent and
/// play counting through a single atomic update, so concurrent callers never
/// duplicate a record or lose a play.
#[derive(Clone)]
pub struct SongResolver {
    store: Arc<dyn SongStore>,
    clock: Arc<dyn Clock>,
}

impl SongResolver {
    pub fn new(store: Arc<dyn SongStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn SongStore> {
        &self.store
    }

    /// Follow `merge_song_id` pointers from `id` to the canonical record.
    ///
    /// Returns `Ok(None)` when `id` is unknown or the chain ends at a missing row.
    pub fn resolve(&self, id: &str) -> Result<Option<Song>, SongError> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = id.to_string();

        loop {
            if !visited.insert(current.clone()) {
                chain.push(current);
                return Err(SongError::IdentityCycle {
                    id: id.to_string(),
                    chain,
                });
            }
            chain.push(current.clone());

            let Some(song) = self.store.get_song(&current)? else {
                if chain.len() > 1 {
                    debug!("Alias chain from {} ends at missing song {}", id, current);
                }
                return Ok(None);
            };

            match song.merge_song_id.as_deref() {
                Some(next) => current = next.to_string(),
                None => return Ok(Some(song)),
            }
        }
    }

    /// Resolve `description` to its canonical record, creating it on first sighting.
    ///
    /// With `is_radio_play` the resolved record gets one more play stamped with
    /// the current time; otherwise an existing record is returned untouched.
    pub fn get_or_create(
        &self,
        description: &SongDescription,
        is_radio_play: bool,
    ) -> Result<Song, SongError> {
        self.find_or_insert(description, is_radio_play)
            .map(|(song, _)| song)
    }

    /// [`get_or_create`](Self::get_or_create), also reporting whether this
    /// call inserted the record.
    pub fn find_or_insert(
        &self,
        description: &SongDescription,
        is_radio_play: bool,
    ) -> Result<(Song, bool), SongError> {
        let id = song_hash(description);

        if let Some(song) = self.resolve(&id)? {
            return Ok((self.finish_lookup(song, is_radio_play)?, false));
        }

        let now = self.clock.now();
        let song = new_song(id.clone(), description, now, is_radio_play);
        if self.store.insert_song_if_absent(&song)? {
            debug!("Created song {} ({:?})", song.id, song.text);
            return Ok((song, true));
        }

        // Lost an insert race, or the id exists behind a dangling alias.
        match self.resolve(&id)? {
            Some(existing) => Ok((self.finish_lookup(existing, is_radio_play)?, false)),
            None => Err(SongError::BrokenAlias { id }),
        }
    }

    /// Make `duplicate` an alias of `canonical`.
    ///
    /// Refuses merges whose target chain leads back to `duplicate`.
    pub fn merge_song(&self, duplicate: &str, canonical: &str) -> Result<Song, SongError> {
        if self.store.get_song(duplicate)?.is_none() {
            return Err(SongError::UnknownSong {
                id: duplicate.to_string(),
            });
        }

        let mut chain = vec![duplicate.to_string()];
        let mut visited = HashSet::from([duplicate.to_string()]);
        let mut current = canonical.to_string();
        let target = loop {
            chain.push(current.clone());
            if !visited.insert(current.clone()) {
                return Err(SongError::IdentityCycle {
                    id: duplicate.to_string(),
                    chain,
                });
            }
            let song = self
                .store
                .get_song(&current)?
                .ok_or_else(|| SongError::UnknownSong {
                    id: current.clone(),
                })?;
            match song.merge_song_id.as_deref() {
                Some(next) => current = next.to_string(),
                None => break song,
            }
        };

        self.store.set_merge_target(duplicate, Some(canonical))?;
        info!("Merged song {} into {}", duplicate, canonical);
        Ok(target)
    }

    fn finish_lookup(&self, song: Song, is_radio_play: bool) -> Result<Song, SongError> {
        if !is_radio_play {
            return Ok(song);
        }
        self.store.record_play(&song.id, self.clock.now())?;
        self.store
            .get_song(&song.id)?
            .ok_or(SongError::BrokenAlias { id: song.id })
    }
}

fn new_song(
    id: String,
    description: &SongDescription,
    now: i64,
    is_radio_play: bool,
) -> Song {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

    let mut text = non_empty(&description.text);
    let mut artist = non_empty(&description.artist);
    let mut title = non_empty(&description.title);

    if text.is_none() && (artist.is_some() || title.is_some()) {
        text = Some(format!(
            "{} - {}",
            artist.as_deref().unwrap_or_default(),
            title.as_deref().unwrap_or_default()
        ));
    }
    if let Some(text) = text.as_deref() {
        if artist.is_none() && title.is_none() {
            let parsed = split_artist_title(text, "-");
            artist = Some(parsed.artist).filter(|a| !a.is_empty());
            title = Some(parsed.title).filter(|t| !t.is_empty());
        }
    }

    Song {
        id,
        text,
        artist,
        title,
        image_url: non_empty(&description.image_url),
        created: now,
        play_count: if is_radio_play { 1 } else { 0 },
        last_played: if is_radio_play { now } else { 0 },
        score: 0,
        merge_song_id: None,
    }
}
