use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Conversation state owned by the page-side chat
///
/// Passed by value on every agentic chat call and forwarded to the backend
/// untouched. It carries the videos found but not yet indexed by a previous
/// turn, which is what lets the backend turn "index the second one" into an
/// indexing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext(Map<String, Value>);

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_found_videos(mut self, videos: &[FoundVideo]) -> Self {
        let value = serde_json::to_value(videos).unwrap_or_else(|_| Value::Array(Vec::new()));
        self.0.insert("found_videos".to_string(), value);
        self
    }

    pub fn with_video_id(mut self, video_id: impl Into<String>) -> Self {
        self.0.insert("video_id".to_string(), Value::String(video_id.into()));
        self
    }

    /// Videos offered by the previous turn, skipping entries that do not parse
    pub fn found_videos(&self) -> Vec<FoundVideo> {
        match self.0.get("found_videos") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        self.0.get("video_id").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ConversationContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Video candidate returned by a search turn
///
/// Unknown fields are preserved so card renderers see everything the backend sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundVideo {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FoundVideo {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Video the backend indexed on behalf of a confirmation turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedVideo {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads a display field the backend may send as a string, a number or a bool
///
/// Other JSON types read as absent instead of failing the whole payload.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// `status` field of an agentic chat stream record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Info,
    Success,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Info => "info",
            ChatStatus::Success => "success",
            ChatStatus::Completed => "completed",
            ChatStatus::Error => "error",
            ChatStatus::Unknown => "unknown",
        }
    }
}

/// Body of `/api/agentic-chat` and payload of a `completed` stream record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChatStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_videos: Option<Vec<FoundVideo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_videos: Option<Vec<IndexedVideo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatPayload {
    pub fn found_video_count(&self) -> usize {
        self.found_videos.as_ref().map_or(0, Vec::len)
    }
}

/// Input of an agentic chat call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatParams {
    pub query: String,
    #[serde(default)]
    pub conversation_context: ConversationContext,
}

impl ChatParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            conversation_context: ConversationContext::default(),
        }
    }

    pub fn with_context(mut self, context: ConversationContext) -> Self {
        self.conversation_context = context;
        self
    }
}
