//! Bulk import of external music catalogs into the song identity store.

mod eqbeats;
mod ponyfm;
mod provider;
mod sync;

pub use eqbeats::{EqBeats, EQBEATS_DEFAULT_BASE_URL};
pub use ponyfm::{PonyFm, PONYFM_DEFAULT_BASE_URL};
pub use provider::{CatalogPage, CatalogProvider, ExternalTrack};
pub use sync::{
    CatalogSync, CatalogSyncError, CatalogSyncReport, DEFAULT_CATALOG_TIMEOUT,
    DEFAULT_MAX_CATALOG_PAGES,
};
