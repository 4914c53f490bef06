use regex::Regex;
use std::sync::OnceLock;

use crate::error::{GatewayError, Result};

fn video_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^https?://(?:",
            r"(?:www\.)?youtube\.com/watch\?v=[\w-]+",
            r"|youtu\.be/[\w-]+",
            r"|(?:www\.)?youtube\.com/embed/[\w-]+",
            r")",
        ))
        .expect("valid video link regex")
    })
}

/// Whether `url` has one of the known video-link shapes (watch, short link, embed)
pub fn is_video_url(url: &str) -> bool {
    video_link_regex().is_match(url)
}

pub fn validate_video_url(url: &str) -> Result<()> {
    if is_video_url(url) {
        Ok(())
    } else {
        Err(GatewayError::Validation("Invalid YouTube URL".to_string()))
    }
}
