//! Now-playing poll job.
//!
//! Polls every stream through the adapter registered for its source type,
//! stores the resulting snapshot, and records a radio play plus a history row
//! whenever an online stream starts a new song.

use crate::background_jobs::tiers::NOWPLAYING_JOB_ID;
use crate::background_jobs::{BackgroundJob, JobContext, JobError};
use crate::clock::UnixTimestamp;
use crate::fetcher::HttpFetcher;
use crate::nowplaying::{process, AdapterContext, AdapterRegistry, NowPlaying};
use crate::songs::{SongDescription, SongError};
use crate::station_store::{NewSongHistoryEntry, Station, StationStream};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct NowPlayingJob {
    registry: AdapterRegistry,
    fetcher: Arc<dyn HttpFetcher>,
    fetch_timeout: Duration,
    parallel: bool,
}

impl NowPlayingJob {
    pub fn new(
        registry: AdapterRegistry,
        fetcher: Arc<dyn HttpFetcher>,
        fetch_timeout: Duration,
        parallel: bool,
    ) -> Self {
        Self {
            registry,
            fetcher,
            fetch_timeout,
            parallel,
        }
    }

    fn poll(&self, station: &Station, stream: &StationStream) -> NowPlaying {
        if !station.is_active {
            return NowPlaying::offline();
        }
        let Some(adapter) = self.registry.get(&stream.source_type) else {
            warn!(
                "No adapter for source type {:?} (stream {} of {})",
                stream.source_type, stream.id, station.name
            );
            return NowPlaying::offline();
        };
        let ctx = AdapterContext::new(station, stream, self.fetcher.as_ref())
            .with_timeout(self.fetch_timeout);
        process(adapter.as_ref(), &ctx)
    }

    /// Credit one play of the current song and append it to the stream's history.
    ///
    /// The history row is written before the play counter, so a failed history
    /// write leaves the song untouched.
    fn record_play(
        &self,
        ctx: &JobContext,
        station: &Station,
        stream: &StationStream,
        nowplaying: &NowPlaying,
        now: UnixTimestamp,
    ) -> Result<(), PlayError> {
        let description = SongDescription::from(&nowplaying.current_song);
        let song = match ctx.songs.get_or_create(&description, false) {
            Ok(song) => song,
            Err(SongError::Store(e)) => return Err(PlayError::Persistence(e.to_string())),
            Err(e) => return Err(PlayError::Identity(e)),
        };

        ctx.station_store
            .record_song_history(&NewSongHistoryEntry {
                station_id: station.id,
                stream_id: stream.id,
                song_id: song.id.clone(),
                timestamp: now,
                listeners: nowplaying.listeners.current,
            })
            .map_err(|e| PlayError::Persistence(e.to_string()))?;
        ctx.songs
            .store()
            .record_play(&song.id, now)
            .map_err(|e| PlayError::Persistence(e.to_string()))?;
        Ok(())
    }
}

enum PlayError {
    Identity(SongError),
    Persistence(String),
}

impl BackgroundJob for NowPlayingJob {
    fn id(&self) -> &'static str {
        NOWPLAYING_JOB_ID
    }

    fn name(&self) -> &'static str {
        "Now Playing Data"
    }

    fn description(&self) -> &'static str {
        "Poll every stream and store its current now-playing snapshot"
    }

    /// Per stream. With parallel fetches the streams are spread over the rayon pool.
    fn time_bound(&self) -> Duration {
        self.fetch_timeout
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let stations = ctx
            .station_store
            .list_stations_with_streams()
            .map_err(|e| JobError::Persistence(e.to_string()))?;
        let targets: Vec<(&Station, &StationStream)> = stations
            .iter()
            .flat_map(|s| s.streams.iter().map(move |stream| (&s.station, stream)))
            .collect();

        debug!(
            "Polling {} streams ({})",
            targets.len(),
            if self.parallel { "parallel" } else { "sequential" }
        );
        let snapshots: Vec<NowPlaying> = if self.parallel {
            targets
                .par_iter()
                .map(|(station, stream)| self.poll(station, stream))
                .collect()
        } else {
            targets
                .iter()
                .map(|(station, stream)| self.poll(station, stream))
                .collect()
        };

        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let now = ctx.clock.now();
        let mut online = 0;
        let mut new_plays = 0;
        let mut integrity_errors = Vec::new();

        for ((station, stream), nowplaying) in targets.iter().zip(&snapshots) {
            let previous = ctx
                .station_store
                .get_nowplaying(stream.id)
                .map_err(|e| JobError::Persistence(e.to_string()))?;

            if nowplaying.is_online() {
                online += 1;
                let song_changed = previous
                    .map(|p| p.nowplaying.current_song.text != nowplaying.current_song.text)
                    .unwrap_or(true);
                if song_changed {
                    match self.record_play(ctx, station, stream, nowplaying, now) {
                        Ok(()) => new_plays += 1,
                        Err(PlayError::Persistence(e)) => return Err(JobError::Persistence(e)),
                        Err(PlayError::Identity(e)) => {
                            error!("Cannot record play on stream {}: {}", stream.id, e);
                            integrity_errors.push(e.to_string());
                        }
                    }
                }
            }

            // Saved last so a persistence failure above keeps the previous
            // snapshot and the next run retries the play.
            ctx.station_store
                .save_nowplaying(stream.id, nowplaying, now)
                .map_err(|e| JobError::Persistence(e.to_string()))?;
        }

        info!(
            "Polled {} streams: {} online, {} new plays",
            targets.len(),
            online,
            new_plays
        );

        if integrity_errors.is_empty() {
            Ok(())
        } else {
            Err(JobError::ExecutionFailed(integrity_errors.join("; ")))
        }
    }
}
