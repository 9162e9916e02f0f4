use crate::songs::SongDescription;
use serde::Deserialize;
use serde_json::Value;

/// One page of a remote catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub tracks: Vec<Value>,
    #[serde(default)]
    pub total_pages: u32,
}

/// A remote track after the provider-specific field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTrack {
    pub external_id: String,
    pub artist: String,
    pub title: String,
    pub web_url: Option<String>,
    pub image_url: Option<String>,
}

impl ExternalTrack {
    pub fn description(&self) -> SongDescription {
        SongDescription {
            text: None,
            artist: Some(self.artist.clone()),
            title: Some(self.title.clone()),
            image_url: self.image_url.clone(),
        }
    }
}

/// An external catalog served as paginated `{tracks, total_pages}` JSON.
pub trait CatalogProvider: Send + Sync {
    /// Short identifier, stored as the `provider` of mirrored rows.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// URL of page `page` (1-based).
    fn page_url(&self, page: u32) -> String;

    /// Translate one raw listing row. `None` for rows missing required fields.
    fn map_track(&self, raw: &Value) -> Option<ExternalTrack>;
}

/// String or number at `pointer`, as a non-empty trimmed string.
pub(crate) fn json_string(raw: &Value, pointer: &str) -> Option<String> {
    let value = match raw.pointer(pointer)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}
