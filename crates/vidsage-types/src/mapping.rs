use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of the mapping table in the local storage area
pub const MAPPINGS_KEY: &str = "videoMappings";

/// Platform video id (the `v` query parameter) -> backend mapping
pub type MappingTable = HashMap<String, VideoMapping>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMapping {
    pub backend_video_id: String,
    pub source_url: String,
    pub created_at: DateTime<Utc>,
}

impl VideoMapping {
    pub fn new(backend_video_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            backend_video_id: backend_video_id.into(),
            source_url: source_url.into(),
            created_at: Utc::now(),
        }
    }
}
