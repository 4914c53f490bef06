use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatStatus, FoundVideo};

/// Notification pushed to the page that issued a request while it is in flight
///
/// Fire-and-forget: delivery is best effort and never affects the outcome of
/// the request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RelayEvent {
    /// Coarse progress step of an index/analyze/chat call
    ProcessingStatusUpdate {
        step: String,
        description: String,
        timestamp: DateTime<Utc>,
    },

    /// Incremental text of a streamed answer
    StreamingChunk {
        chunk: String,
        full_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        found_videos: Option<Vec<FoundVideo>>,
    },

    /// Informational line emitted by the agentic chat backend
    AgenticChatStatus {
        status: ChatStatus,
        message: String,
    },
}

impl RelayEvent {
    pub fn progress(step: ProgressStep, description: impl Into<String>) -> Self {
        RelayEvent::ProcessingStatusUpdate {
            step: step.label().to_string(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn chunk(chunk: impl Into<String>, full_text: impl Into<String>) -> Self {
        RelayEvent::StreamingChunk {
            chunk: chunk.into(),
            full_text: full_text.into(),
            found_videos: None,
        }
    }

    pub fn chat_status(status: ChatStatus, message: impl Into<String>) -> Self {
        RelayEvent::AgenticChatStatus {
            status,
            message: message.into(),
        }
    }

    /// Wire name, used as the SSE event name by the host
    pub fn action(&self) -> &'static str {
        match self {
            RelayEvent::ProcessingStatusUpdate { .. } => "processingStatusUpdate",
            RelayEvent::StreamingChunk { .. } => "streamingChunk",
            RelayEvent::AgenticChatStatus { .. } => "agenticChatStatus",
        }
    }
}

/// Step names shown in the sidebar progress tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    DownloadingVideo,
    ProcessingContent,
    Uploading,
    AiIndexing,
    Ready,
    Error,
    PreparingAnalysis,
    ConnectingToAi,
    StreamingResponse,
    ProcessingQuery,
    ProcessingResponse,
}

impl ProgressStep {
    /// The ordered steps of a successful indexing run
    pub const INDEXING: [ProgressStep; 5] = [
        ProgressStep::DownloadingVideo,
        ProgressStep::ProcessingContent,
        ProgressStep::Uploading,
        ProgressStep::AiIndexing,
        ProgressStep::Ready,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProgressStep::DownloadingVideo => "Downloading Video",
            ProgressStep::ProcessingContent => "Processing Content",
            ProgressStep::Uploading => "Uploading to Twelve Labs",
            ProgressStep::AiIndexing => "AI Indexing",
            ProgressStep::Ready => "Ready for Analysis",
            ProgressStep::Error => "Error",
            ProgressStep::PreparingAnalysis => "Preparing Analysis",
            ProgressStep::ConnectingToAi => "Connecting to AI",
            ProgressStep::StreamingResponse => "Streaming Response",
            ProgressStep::ProcessingQuery => "Processing Query",
            ProgressStep::ProcessingResponse => "Processing Response",
        }
    }

    /// Default description paired with the step
    pub fn description(&self) -> &'static str {
        match self {
            ProgressStep::DownloadingVideo => "Retrieving video content from YouTube",
            ProgressStep::ProcessingContent => "Extracting audio, visual, and text data",
            ProgressStep::Uploading => "Sending video to AI processing engine",
            ProgressStep::AiIndexing => "Creating searchable embeddings and analysis",
            ProgressStep::Ready => "Video is indexed and ready for questions",
            ProgressStep::Error => "Processing failed",
            ProgressStep::PreparingAnalysis => "Setting up AI analysis request...",
            ProgressStep::ConnectingToAi => "Starting streaming analysis...",
            ProgressStep::StreamingResponse => "Receiving AI analysis...",
            ProgressStep::ProcessingQuery => "Understanding your request...",
            ProgressStep::ProcessingResponse => "Getting results from AI...",
        }
    }
}
