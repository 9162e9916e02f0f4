use super::provider::{json_string, CatalogProvider, ExternalTrack};
use serde_json::Value;

pub const PONYFM_DEFAULT_BASE_URL: &str = "https://pony.fm/api/web/tracks";
const CLIENT_ID: &str = "radiosync";

/// Pony.fm public track listing.
pub struct PonyFm {
    base_url: String,
}

impl PonyFm {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for PonyFm {
    fn default() -> Self {
        Self::new(PONYFM_DEFAULT_BASE_URL)
    }
}

impl CatalogProvider for PonyFm {
    fn id(&self) -> &'static str {
        "ponyfm"
    }

    fn name(&self) -> &'static str {
        "Pony.fm"
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}?page={}&client={}",
            self.base_url,
            page,
            urlencoding::encode(CLIENT_ID)
        )
    }

    fn map_track(&self, raw: &Value) -> Option<ExternalTrack> {
        Some(ExternalTrack {
            external_id: json_string(raw, "/id")?,
            artist: json_string(raw, "/user/name")?,
            title: json_string(raw, "/title")?,
            web_url: json_string(raw, "/url"),
            image_url: json_string(raw, "/covers/normal"),
        })
    }
}
