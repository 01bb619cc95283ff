//! Photo search response types.

use serde::{Deserialize, Serialize};

/// Search response from the photo service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
}

/// One search candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
    pub src: PhotoSources,
}

/// Resolution variants of a photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoSources {
    pub original: Option<String>,
    pub large2x: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
    pub portrait: Option<String>,
    pub landscape: Option<String>,
    pub tiny: Option<String>,
}

impl Photo {
    /// URL of the large variant used as the video background.
    ///
    /// Prefers `large2x`, then `large`, then `original`.
    pub fn background_url(&self) -> Option<&str> {
        self.src
            .large2x
            .as_deref()
            .or(self.src.large.as_deref())
            .or(self.src.original.as_deref())
    }
}
