//! Command protocol between the page-side relay and the background service
//!
//! Each request is one [`Command`] variant tagged by `action`; it resolves to
//! exactly one [`Reply`]. Progress travels separately as
//! [`RelayEvent`](crate::RelayEvent)s.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::AnalyzeParams;
use crate::chat::{ChatParams, FoundVideo, IndexedVideo};
use crate::settings::{ConfigPatch, Settings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    GetBackendUrl,
    SaveBackendUrl { backend_url: String },
    CheckBackendHealth,
    IndexVideo { video_url: String },
    AnalyzeVideo(AnalyzeParams),
    AnalyzeVideoStream(AnalyzeParams),
    GetVideoId { video_url: String },
    AgenticChat(ChatParams),
    AgenticChatStream(ChatParams),
    GetConfig,
    SaveConfig(ConfigPatch),
    Test,
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::GetBackendUrl => "getBackendUrl",
            Command::SaveBackendUrl { .. } => "saveBackendUrl",
            Command::CheckBackendHealth => "checkBackendHealth",
            Command::IndexVideo { .. } => "indexVideo",
            Command::AnalyzeVideo(_) => "analyzeVideo",
            Command::AnalyzeVideoStream(_) => "analyzeVideoStream",
            Command::GetVideoId { .. } => "getVideoId",
            Command::AgenticChat(_) => "agenticChat",
            Command::AgenticChatStream(_) => "agenticChatStream",
            Command::GetConfig => "getConfig",
            Command::SaveConfig(_) => "saveConfig",
            Command::Test => "test",
        }
    }
}

/// Result of a successful `indexVideo`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOutcome {
    pub backend_video_id: String,
    pub message: Option<String>,
}

/// Result of an analyze call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    #[serde(rename = "result")]
    pub text: String,
    pub backend_video_id: String,
    pub analysis_type: String,
}

/// Result of an agentic chat call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutcome {
    #[serde(rename = "result")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub found_videos: Vec<FoundVideo>,
    pub indexed_videos: Vec<IndexedVideo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_video_id: Option<String>,
}

/// Successful outcome as seen by the page: the payload plus `success: true`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    #[serde(flatten)]
    pub value: T,
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub streaming: bool,
}

impl<T> Resolved<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            success: true,
            streaming: false,
        }
    }

    pub fn streamed(value: T) -> Self {
        Self {
            value,
            success: true,
            streaming: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pong {
    pub status: String,
    pub timestamp: i64,
}

impl Pong {
    pub fn now() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Value a command resolves to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    BackendUrl(String),
    Saved { success: bool },
    Health(Value),
    Indexed(Resolved<IndexOutcome>),
    Analysis(Resolved<AnalysisOutcome>),
    /// `null` when the video has not been indexed yet
    VideoId(Option<String>),
    Chat(Resolved<ChatOutcome>),
    Config(Settings),
    Pong(Pong),
}

impl Reply {
    pub fn saved() -> Self {
        Reply::Saved { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisKind;
    use serde_json::json;

    #[test]
    fn test_command_parsing() {
        let cmd: Command = serde_json::from_value(json!({
            "action": "analyzeVideo",
            "videoId": "tl_42",
            "type": "highlights",
            "prompt": null
        }))
        .unwrap();

        match cmd {
            Command::AnalyzeVideo(params) => {
                assert_eq!(params.video_id, "tl_42");
                assert_eq!(params.kind, AnalysisKind::Highlights);
            }
            other => panic!("Expected AnalyzeVideo, got {:?}", other),
        }

        let cmd: Command = serde_json::from_value(json!({
            "action": "saveBackendUrl",
            "backendUrl": "http://localhost:5000"
        }))
        .unwrap();
        assert_eq!(
            cmd,
            Command::SaveBackendUrl {
                backend_url: "http://localhost:5000".to_string()
            }
        );
    }

    #[test]
    fn test_chat_command_defaults_context() {
        let cmd: Command =
            serde_json::from_value(json!({"action": "agenticChatStream", "query": "find rust talks"}))
                .unwrap();

        match cmd {
            Command::AgenticChatStream(params) => {
                assert_eq!(params.query, "find rust talks");
                assert!(params.conversation_context.as_map().is_empty());
            }
            other => panic!("Expected AgenticChatStream, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = serde_json::from_value::<Command>(json!({"action": "deleteEverything"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_action_names_match_wire_tags() {
        let commands = vec![
            Command::GetBackendUrl,
            Command::CheckBackendHealth,
            Command::IndexVideo { video_url: "u".to_string() },
            Command::GetVideoId { video_url: "u".to_string() },
            Command::GetConfig,
            Command::Test,
        ];

        for cmd in commands {
            let json = serde_json::to_value(&cmd).unwrap();
            assert_eq!(json["action"], cmd.action());
        }
    }

    #[test]
    fn test_reply_shapes() {
        let reply = Reply::Indexed(Resolved::new(IndexOutcome {
            backend_video_id: "tl_42".to_string(),
            message: Some("ok".to_string()),
        }));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"backendVideoId": "tl_42", "message": "ok", "success": true})
        );

        let reply = Reply::Analysis(Resolved::streamed(AnalysisOutcome {
            text: "Hello world".to_string(),
            backend_video_id: "tl_42".to_string(),
            analysis_type: "summary".to_string(),
        }));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["result"], "Hello world");
        assert_eq!(json["streaming"], true);

        assert_eq!(serde_json::to_value(Reply::VideoId(None)).unwrap(), Value::Null);
        assert_eq!(serde_json::to_value(Reply::saved()).unwrap(), json!({"success": true}));
    }
}
