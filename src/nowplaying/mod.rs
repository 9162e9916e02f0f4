//! Canonical now-playing snapshots and the adapters that produce them.
//!
//! Each vendor adapter only merges what its source reports into a
//! [`NowPlayingDraft`]; [`process`] owns the shared rules (inactive streams,
//! unreachable sources, string cleanup, listener backfill, status derivation).

mod adapter;
mod registry;
mod snapshot;
mod text;

pub use adapter::{process, AdapterContext, AdapterError, StreamAdapter};
pub use registry::{AdapterRegistry, NullAdapter, PlainTextAdapter};
pub use snapshot::{
    CurrentSong, DraftListeners, DraftMeta, Listeners, Meta, NowPlaying, NowPlayingDraft,
    StreamStatus, OFFLINE_SONG_TEXT,
};
pub use text::{parse_count, reconcile_listener_count, split_artist_title};

#[cfg(test)]
pub(crate) use adapter::test_support;
