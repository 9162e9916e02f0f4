use super::provider::{CatalogPage, CatalogProvider};
use crate::fetcher::{FetchError, FetchOptions, HttpFetcher};
use crate::song_store::ExternalSong;
use crate::songs::{song_hash, SongError, SongResolver};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// Ceiling on the page count a remote listing may announce.
pub const DEFAULT_MAX_CATALOG_PAGES: u32 = 2_000;

#[derive(Debug, Error)]
pub enum CatalogSyncError {
    #[error("first page of {provider} unavailable: {reason}")]
    FirstPageUnavailable { provider: String, reason: String },

    #[error("catalog sync cancelled")]
    Cancelled,

    #[error("catalog store failure: {0:#}")]
    Store(anyhow::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSyncReport {
    pub total_pages: u32,
    pub pages_loaded: u32,
    pub pages_failed: u32,
    pub tracks_seen: usize,
    pub tracks_skipped: usize,
    pub songs_created: usize,
    pub external_rows_written: usize,
}

/// Mirrors one external catalog into the songs database.
///
/// Every page is written in its own transaction, so a page that fails later
/// never takes earlier pages with it.
pub struct CatalogSync {
    provider: Arc<dyn CatalogProvider>,
    fetcher: Arc<dyn HttpFetcher>,
    timeout: Duration,
    max_pages: u32,
}

impl CatalogSync {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        fetcher: Arc<dyn HttpFetcher>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            fetcher,
            timeout,
            max_pages: DEFAULT_MAX_CATALOG_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn provider(&self) -> &dyn CatalogProvider {
        self.provider.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn run(
        &self,
        songs: &SongResolver,
        now: i64,
        cancel: &CancellationToken,
    ) -> Result<CatalogSyncReport, CatalogSyncError> {
        let provider_id = self.provider.id();
        let store = songs.store();

        let first_page = self.load_page(1).map_err(|reason| {
            CatalogSyncError::FirstPageUnavailable {
                provider: self.provider.name().to_string(),
                reason,
            }
        })?;

        let mut existing = store
            .get_external_song_ids(provider_id)
            .map_err(CatalogSyncError::Store)?;
        let mut mapped_hashes: HashSet<String> = existing.values().cloned().collect();
        let mut known_songs = store.get_song_ids().map_err(CatalogSyncError::Store)?;

        let announced_pages = first_page.total_pages.max(1);
        if announced_pages > self.max_pages {
            warn!(
                "{} announces {} pages, reading only the first {}",
                self.provider.name(),
                announced_pages,
                self.max_pages
            );
        }
        let mut report = CatalogSyncReport {
            total_pages: announced_pages.min(self.max_pages),
            ..Default::default()
        };
        info!(
            "Syncing {} catalog: {} page(s), {} tracks already mirrored",
            self.provider.name(),
            report.total_pages,
            existing.len()
        );

        let mut page = Some(first_page);
        for page_num in 1..=report.total_pages {
            if cancel.is_cancelled() {
                return Err(CatalogSyncError::Cancelled);
            }

            let current = match page.take() {
                Some(p) => p,
                None => match self.load_page(page_num) {
                    Ok(p) => p,
                    Err(reason) => {
                        warn!(
                            "{} page {} unavailable, continuing: {}",
                            self.provider.name(),
                            page_num,
                            reason
                        );
                        report.pages_failed += 1;
                        continue;
                    }
                },
            };
            report.pages_loaded += 1;

            let batch = self.process_page(
                &current,
                songs,
                now,
                &mut existing,
                &mut mapped_hashes,
                &mut known_songs,
                &mut report,
            )?;

            if !batch.is_empty() {
                report.external_rows_written += store
                    .upsert_external_songs(&batch)
                    .map_err(CatalogSyncError::Store)?;
            }
            debug!(
                "{} page {}/{}: {} rows written",
                self.provider.name(),
                page_num,
                report.total_pages,
                batch.len()
            );
        }

        info!(
            "{} sync done: {} tracks, {} new songs, {} rows written, {} page(s) failed",
            self.provider.name(),
            report.tracks_seen,
            report.songs_created,
            report.external_rows_written,
            report.pages_failed
        );
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_page(
        &self,
        page: &CatalogPage,
        songs: &SongResolver,
        now: i64,
        existing: &mut HashMap<String, String>,
        mapped_hashes: &mut HashSet<String>,
        known_songs: &mut HashSet<String>,
        report: &mut CatalogSyncReport,
    ) -> Result<Vec<ExternalSong>, CatalogSyncError> {
        let mut batch = Vec::new();

        for raw in &page.tracks {
            report.tracks_seen += 1;
            let Some(track) = self.provider.map_track(raw) else {
                report.tracks_skipped += 1;
                continue;
            };

            let description = track.description();
            let hash = song_hash(&description);

            if !known_songs.contains(&hash) {
                match songs.find_or_insert(&description, false) {
                    Ok((_, true)) => report.songs_created += 1,
                    Ok((_, false)) => {}
                    Err(SongError::Store(e)) => return Err(CatalogSyncError::Store(e)),
                    Err(e) => {
                        error!(
                            "{} track {} has no usable identity: {}",
                            self.provider.name(),
                            track.external_id,
                            e
                        );
                        report.tracks_skipped += 1;
                        continue;
                    }
                }
                known_songs.insert(hash.clone());
            }

            let should_write = match existing.get(&track.external_id) {
                Some(song_id) => *song_id != hash,
                None => !mapped_hashes.contains(&hash),
            };
            if !should_write {
                continue;
            }

            existing.insert(track.external_id.clone(), hash.clone());
            mapped_hashes.insert(hash.clone());
            batch.push(ExternalSong {
                provider: self.provider.id().to_string(),
                external_id: track.external_id,
                song_id: hash,
                artist: Some(track.artist),
                title: Some(track.title),
                web_url: track.web_url,
                image_url: track.image_url,
                updated_at: now,
            });
        }

        Ok(batch)
    }

    fn load_page(&self, page: u32) -> Result<CatalogPage, String> {
        let request = FetchOptions::with_url(self.provider.page_url(page))
            .resolve(None, self.timeout)
            .map_err(|e| e.to_string())?;
        let body = self
            .fetcher
            .fetch(&request)
            .map_err(|e: FetchError| e.to_string())?;
        serde_json::from_slice(&body).map_err(|e| format!("malformed listing: {}", e))
    }
}
