use super::snapshot::{NowPlaying, NowPlayingDraft};
use crate::fetcher::{FetchError, FetchOptions, HttpFetcher, DEFAULT_FETCH_TIMEOUT};
use crate::station_store::{Station, StationStream};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("source unreachable: {0}")]
    SourceUnreachable(#[from] FetchError),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Everything an adapter may look at while polling one stream.
pub struct AdapterContext<'a> {
    pub station: &'a Station,
    pub stream: &'a StationStream,
    pub fetcher: &'a dyn HttpFetcher,
    pub default_timeout: Duration,
}

impl<'a> AdapterContext<'a> {
    pub fn new(station: &'a Station, stream: &'a StationStream, fetcher: &'a dyn HttpFetcher) -> Self {
        Self {
            station,
            stream,
            fetcher,
            default_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Fetch the stream's status URL, or whatever `options` override.
    pub fn fetch_remote(&self, options: FetchOptions) -> Result<Vec<u8>, FetchError> {
        let request = options.resolve(Some(self.stream.status_url()), self.default_timeout)?;
        debug!(
            "Fetching {} for stream {} (timeout {:?})",
            request.url, self.stream.id, request.timeout
        );
        self.fetcher.fetch(&request)
    }
}

/// Vendor-specific half of a stream adapter.
///
/// Implementations fill in whatever subset of the draft their source reports;
/// cleanup, status derivation and listener backfill happen in [`process`].
pub trait StreamAdapter: Send + Sync {
    fn source_type(&self) -> &'static str;

    fn fetch_and_merge(
        &self,
        ctx: &AdapterContext<'_>,
        draft: &mut NowPlayingDraft,
    ) -> Result<(), AdapterError>;
}

/// Produce the finalized snapshot for one stream.
///
/// Inactive streams are never fetched. An unreachable source yields the default
/// offline snapshot; a malformed payload keeps whatever fields were merged before
/// the adapter gave up.
pub fn process(adapter: &dyn StreamAdapter, ctx: &AdapterContext<'_>) -> NowPlaying {
    if !ctx.stream.is_active {
        return NowPlaying::offline();
    }

    let mut draft = NowPlayingDraft::default();
    match adapter.fetch_and_merge(ctx, &mut draft) {
        Ok(()) => draft.finalize(),
        Err(AdapterError::SourceUnreachable(e)) => {
            debug!(
                "Stream {} of {} unreachable: {}",
                ctx.stream.id, ctx.station.name, e
            );
            NowPlaying::offline()
        }
        Err(AdapterError::MalformedPayload(reason)) => {
            warn!(
                "Stream {} of {} returned a malformed payload: {}",
                ctx.stream.id, ctx.station.name, reason
            );
            draft.finalize()
        }
    }
}
