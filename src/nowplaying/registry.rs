use super::adapter::{AdapterContext, AdapterError, StreamAdapter};
use super::snapshot::NowPlayingDraft;
use super::text::split_artist_title;
use crate::fetcher::FetchOptions;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Adapters keyed by the `source_type` stored on each stream.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Arc<dyn StreamAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the adapters this crate ships.
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NullAdapter));
        registry.register(Arc::new(PlainTextAdapter::default()));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn StreamAdapter>) {
        info!("Registering stream adapter: {}", adapter.source_type());
        self.adapters.insert(adapter.source_type(), adapter);
    }

    pub fn get(&self, source_type: &str) -> Option<Arc<dyn StreamAdapter>> {
        self.adapters.get(source_type).cloned()
    }

    pub fn source_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.adapters.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

/// Adapter for streams with no status endpoint; they always read as offline.
pub struct NullAdapter;

impl StreamAdapter for NullAdapter {
    fn source_type(&self) -> &'static str {
        "none"
    }

    fn fetch_and_merge(
        &self,
        _ctx: &AdapterContext<'_>,
        _draft: &mut NowPlayingDraft,
    ) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Reads a status URL whose body is a single "Artist - Title" line.
pub struct PlainTextAdapter {
    delimiter: String,
}

impl Default for PlainTextAdapter {
    fn default() -> Self {
        Self {
            delimiter: "-".to_string(),
        }
    }
}

impl StreamAdapter for PlainTextAdapter {
    fn source_type(&self) -> &'static str {
        "text"
    }

    fn fetch_and_merge(
        &self,
        ctx: &AdapterContext<'_>,
        draft: &mut NowPlayingDraft,
    ) -> Result<(), AdapterError> {
        let body = ctx.fetch_remote(FetchOptions::default())?;
        let body = String::from_utf8(body)
            .map_err(|e| AdapterError::MalformedPayload(format!("body is not UTF-8: {}", e)))?;

        let line = body.lines().map(str::trim).find(|l| !l.is_empty());
        let Some(line) = line else {
            return Err(AdapterError::MalformedPayload("empty body".to_string()));
        };

        let song = split_artist_title(line, &self.delimiter);
        if song.text.is_empty() {
            return Err(AdapterError::MalformedPayload(
                "no song in status line".to_string(),
            ));
        }
        draft.current_song = song;
        Ok(())
    }
}
