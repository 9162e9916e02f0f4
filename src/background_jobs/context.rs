use crate::clock::Clock;
use crate::songs::SongResolver;
use crate::station_store::StationStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Stations, streams, current snapshots and song history.
    pub station_store: Arc<dyn StationStore>,

    /// Song identity resolution over the songs database.
    pub songs: SongResolver,

    pub clock: Arc<dyn Clock>,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        station_store: Arc<dyn StationStore>,
        songs: SongResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cancellation_token,
            station_store,
            songs,
            clock,
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
