use regex::Regex;
use std::sync::OnceLock;

use vidsage_types::VideoMapping;

use crate::storage::Storage;

fn video_param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[?&]v=([^&#]+)").expect("valid video id regex"))
}

/// Platform-native video id taken from the `v` query parameter
///
/// Short links (`youtu.be/<id>`) and embeds carry no `v` parameter and yield `None`.
pub fn platform_video_id(url: &str) -> Option<String> {
    video_param_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Maps page URLs to backend video identifiers
///
/// Neither operation can fail from the caller's point of view: problems are
/// logged and surface as "nothing stored" / "not indexed yet".
#[derive(Clone)]
pub struct VideoMapper {
    storage: Storage,
}

impl VideoMapper {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Remember that `source_url` was indexed as `backend_video_id`
    ///
    /// Overwrites any previous mapping for the same video. Returns whether a
    /// mapping was written.
    pub async fn store(&self, source_url: &str, backend_video_id: &str) -> bool {
        let Some(platform_id) = platform_video_id(source_url) else {
            tracing::warn!(source_url, "No video id in URL, mapping not stored");
            return false;
        };

        let mapping = VideoMapping::new(backend_video_id, source_url);
        let key = platform_id.clone();
        let result = self
            .storage
            .update_mappings(move |table| {
                table.insert(key, mapping);
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(platform_id = %platform_id, backend_video_id, "Stored video mapping");
                true
            }
            Err(e) => {
                tracing::error!(platform_id = %platform_id, "Failed to store video mapping: {}", e);
                false
            }
        }
    }

    /// Backend id for `source_url`, or `None` if it has not been indexed
    pub async fn lookup(&self, source_url: &str) -> Option<String> {
        self.entry(source_url).await.map(|m| m.backend_video_id)
    }

    /// Full mapping record for `source_url`
    pub async fn entry(&self, source_url: &str) -> Option<VideoMapping> {
        let platform_id = platform_video_id(source_url)?;

        match self.storage.mappings().await {
            Ok(mut table) => {
                let found = table.remove(&platform_id);
                tracing::debug!(platform_id = %platform_id, found = found.is_some(), "Looked up video mapping");
                found
            }
            Err(e) => {
                tracing::error!(platform_id = %platform_id, "Failed to read video mappings: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_URL: &str = "https://www.youtube.com/watch?v=abc123";

    async fn mapper() -> VideoMapper {
        VideoMapper::new(Storage::builder().in_memory().build().await.unwrap())
    }

    #[test]
    fn test_platform_video_id() {
        assert_eq!(platform_video_id(WATCH_URL).as_deref(), Some("abc123"));
        assert_eq!(
            platform_video_id("https://www.youtube.com/watch?list=PL1&v=xyz&t=42s").as_deref(),
            Some("xyz")
        );
        assert_eq!(
            platform_video_id("https://www.youtube.com/watch?v=xyz#t=10").as_deref(),
            Some("xyz")
        );
        assert_eq!(platform_video_id("https://youtu.be/abc123"), None);
        assert_eq!(platform_video_id("https://www.youtube.com/watch?vv=abc"), None);
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let mapper = mapper().await;

        assert!(mapper.store(WATCH_URL, "tl_42").await);
        assert_eq!(mapper.lookup(WATCH_URL).await.as_deref(), Some("tl_42"));

        // Same video reached through a different URL shape
        assert_eq!(
            mapper
                .lookup("https://youtube.com/watch?v=abc123&t=5s")
                .await
                .as_deref(),
            Some("tl_42")
        );
    }

    #[tokio::test]
    async fn test_lookup_is_idempotent() {
        let mapper = mapper().await;
        mapper.store(WATCH_URL, "tl_42").await;

        let urls = [WATCH_URL, "https://www.youtube.com/watch?v=missing", "not a url"];
        for url in urls {
            let first = mapper.lookup(url).await;
            let second = mapper.lookup(url).await;
            assert_eq!(first, second, "lookup changed for {}", url);
        }
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let mapper = mapper().await;
        mapper.store(WATCH_URL, "tl_1").await;
        mapper.store(WATCH_URL, "tl_2").await;

        let entry = mapper.entry(WATCH_URL).await.unwrap();
        assert_eq!(entry.backend_video_id, "tl_2");
        assert_eq!(entry.source_url, WATCH_URL);
    }

    #[tokio::test]
    async fn test_store_without_video_id_is_silent() {
        let mapper = mapper().await;

        assert!(!mapper.store("https://youtu.be/abc123", "tl_9").await);
        assert_eq!(mapper.lookup("https://youtu.be/abc123").await, None);
    }
}
