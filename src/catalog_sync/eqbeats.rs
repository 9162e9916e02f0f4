use super::provider::{json_string, CatalogProvider, ExternalTrack};
use serde_json::Value;

pub const EQBEATS_DEFAULT_BASE_URL: &str = "https://eqbeats.org/tracks/all/json";

/// EqBeats track listing.
pub struct EqBeats {
    base_url: String,
}

impl EqBeats {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for EqBeats {
    fn default() -> Self {
        Self::new(EQBEATS_DEFAULT_BASE_URL)
    }
}

impl CatalogProvider for EqBeats {
    fn id(&self) -> &'static str {
        "eqbeats"
    }

    fn name(&self) -> &'static str {
        "EqBeats"
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}?page={}", self.base_url, page)
    }

    fn map_track(&self, raw: &Value) -> Option<ExternalTrack> {
        Some(ExternalTrack {
            external_id: json_string(raw, "/id")?,
            artist: json_string(raw, "/artist/name")?,
            title: json_string(raw, "/title")?,
            web_url: json_string(raw, "/link"),
            image_url: json_string(raw, "/download/art"),
        })
    }
}
