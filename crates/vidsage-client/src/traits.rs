use async_trait::async_trait;
use serde_json::Value;

use vidsage_types::{AnalysisOutcome, AnalyzeParams, ChatOutcome, ChatParams, IndexOutcome};

use crate::error::Result;
use crate::sink::ProgressSink;

/// Operations the remote AI backend offers
///
/// Every call resolves the backend URL from settings first and fails with
/// [`GatewayError::Configuration`](crate::GatewayError::Configuration) before
/// any network traffic when it is not configured.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Backend liveness payload
    async fn check_health(&self) -> Result<Value>;

    /// Download and index a video, reporting the fixed indexing steps
    async fn index_video(&self, video_url: &str, sink: &dyn ProgressSink) -> Result<IndexOutcome>;

    /// Streamed analysis of an indexed video
    async fn analyze(&self, params: &AnalyzeParams, sink: &dyn ProgressSink) -> Result<AnalysisOutcome>;

    /// One-shot chat; the answer comes back as inline formatted text
    async fn agentic_chat(&self, params: &ChatParams, sink: &dyn ProgressSink) -> Result<ChatOutcome>;

    /// Streamed chat; found/indexed videos come back structured
    async fn agentic_chat_stream(&self, params: &ChatParams, sink: &dyn ProgressSink) -> Result<ChatOutcome>;
}
