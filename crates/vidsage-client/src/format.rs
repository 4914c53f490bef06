//! Text shaping for agentic chat answers

use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

use vidsage_types::ChatPayload;

const DEFAULT_RESPONSE: &str = "I processed your request.";

fn intent_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^intent classified as:\s*").expect("valid intent prefix regex"))
}

/// Remove the backend's intent-classification echo from a chat answer
///
/// When nothing is left and videos were found, a short "Found N videos for
/// you:" line stands in for the answer. Text without the prefix is returned
/// as-is.
pub fn strip_intent_prefix(response: &str, found_videos: usize) -> String {
    let Some(prefix) = intent_prefix_regex().find(response) else {
        return response.to_string();
    };

    let rest = response[prefix.end()..].trim();
    if rest.is_empty() && found_videos > 0 {
        let plural = if found_videos > 1 { "s" } else { "" };
        return format!("Found {} video{} for you:", found_videos, plural);
    }
    rest.to_string()
}

/// Inline markdown rendering of a non-streamed chat answer
///
/// Used by the older sidebar that shows a single text bubble; the card-based
/// sidebar renders the structured lists itself.
pub fn render_inline(payload: &ChatPayload) -> String {
    let response = payload
        .response
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(|r| strip_intent_prefix(r, payload.found_video_count()))
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());

    let mut text = response;

    if let Some(videos) = payload.found_videos.as_ref().filter(|v| !v.is_empty()) {
        text.push_str("\n\n**Found Videos:**\n\n");
        for (i, video) in videos.iter().enumerate() {
            let _ = writeln!(text, "{}. **{}**", i + 1, video.title.as_deref().unwrap_or("Untitled"));
            if let Some(channel) = video.channel_name.as_deref().filter(|c| !c.is_empty()) {
                let _ = writeln!(text, "   📺 Channel: {}", channel);
            }
            if let Some(duration) = video.duration.as_deref().filter(|d| !d.is_empty() && *d != "Unknown") {
                let _ = writeln!(text, "   ⏱️ Duration: {}", duration);
            }
            if let Some(url) = video.url.as_deref().filter(|u| !u.is_empty()) {
                let _ = writeln!(text, "   🔗 {}", url);
            }
            text.push('\n');
        }
    }

    if let Some(videos) = payload.indexed_videos.as_ref().filter(|v| !v.is_empty()) {
        text.push_str("\n**Indexed Videos:**\n\n");
        for (i, video) in videos.iter().enumerate() {
            let url = video
                .video_url
                .as_deref()
                .or(video.url.as_deref())
                .unwrap_or("Video");
            let status = video.status.as_deref().unwrap_or("indexed");
            let _ = writeln!(text, "{}. {} - {}", i + 1, url, status);
        }
        text.push('\n');
    }

    if let Some(analysis) = payload.analysis_result.as_deref().filter(|a| !a.is_empty()) {
        text.push_str("\n**Analysis Result:**\n\n");
        text.push_str(analysis);
    }

    text
}
