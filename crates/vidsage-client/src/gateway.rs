//! HTTP gateway to the remote AI backend

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use vidsage_store::{Storage, VideoMapper};
use vidsage_types::{
    AnalysisOutcome, AnalyzeParams, BackendUrl, ChatOutcome, ChatParams, ChatPayload,
    IndexOutcome, ProgressStep, RelayEvent,
};

use crate::config::GatewayConfig;
use crate::decoder::{decode_stream, AnalysisMetadata, NdjsonDecoder, SseDecoder, StreamRecord};
use crate::error::{GatewayError, Result};
use crate::format::{render_inline, strip_intent_prefix};
use crate::session::StreamingSession;
use crate::sink::ProgressSink;
use crate::traits::BackendApi;
use crate::validate::validate_video_url;

const HEALTH_PATH: &str = "/api/health";
const INDEX_PATH: &str = "/api/download-and-index";
const ANALYZE_PATH: &str = "/api/analyze";
const CHAT_PATH: &str = "/api/agentic-chat";
const CHAT_STREAM_PATH: &str = "/api/agentic-chat/stream";

/// Backend coordinates read from settings at the start of every call
struct ResolvedBackend {
    base_url: BackendUrl,
    api_key: Option<String>,
}

impl ResolvedBackend {
    fn endpoint(&self, path: &str) -> Result<String> {
        self.base_url.endpoint(path).ok_or(GatewayError::Configuration)
    }
}

#[derive(Debug, Default, Deserialize)]
struct IndexResponse {
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client of the backend's index/analyze/chat endpoints
///
/// Holds no per-call state; every call reads the current settings, so a
/// backend URL saved mid-session applies to the next call.
#[derive(Clone)]
pub struct BackendGateway {
    http_client: reqwest::Client,
    storage: Storage,
    mapper: VideoMapper,
}

impl BackendGateway {
    pub fn new(storage: Storage) -> Result<Self> {
        Self::builder().storage(storage).build()
    }

    pub fn builder() -> BackendGatewayBuilder {
        BackendGatewayBuilder::default()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn mapper(&self) -> &VideoMapper {
        &self.mapper
    }

    async fn backend(&self) -> Result<ResolvedBackend> {
        let settings = self.storage.settings().await?;
        if !settings.backend_url.is_configured() {
            tracing::warn!("Backend URL not configured");
            return Err(GatewayError::Configuration);
        }

        Ok(ResolvedBackend {
            base_url: settings.backend_url,
            api_key: settings.api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    async fn send(&self, request: RequestBuilder, backend: &ResolvedBackend) -> Result<Response> {
        let request = match &backend.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        };

        request.send().await.map_err(|e| {
            tracing::error!(backend = %backend.base_url, "Backend request could not be sent: {}", e);
            GatewayError::Transport(e)
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.text().await.map_err(GatewayError::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(body = %body, "Unexpected backend response: {}", e);
            GatewayError::InvalidResponse(e.to_string())
        })
    }

    async fn index_inner(&self, video_url: &str, sink: &dyn ProgressSink) -> Result<IndexOutcome> {
        validate_video_url(video_url)?;
        let backend = self.backend().await?;

        for step in [
            ProgressStep::DownloadingVideo,
            ProgressStep::ProcessingContent,
            ProgressStep::Uploading,
        ] {
            sink.emit(RelayEvent::progress(step, step.description()));
        }

        let request = self
            .http_client
            .post(backend.endpoint(INDEX_PATH)?)
            .json(&json!({ "youtube_url": video_url }));
        let response = self.send(request, &backend).await?;

        if !response.status().is_success() {
            return Err(protocol_error(response, "Backend request failed").await);
        }

        let result: IndexResponse = Self::read_json(response).await?;
        if let Some(error) = result.error {
            return Err(GatewayError::Application(error));
        }

        sink.emit(RelayEvent::progress(
            ProgressStep::AiIndexing,
            ProgressStep::AiIndexing.description(),
        ));

        let backend_video_id = result
            .video_id
            .filter(|id| !id.is_empty())
            .ok_or(GatewayError::MissingVideoId)?;

        self.mapper.store(video_url, &backend_video_id).await;
        sink.emit(RelayEvent::progress(ProgressStep::Ready, ProgressStep::Ready.description()));

        tracing::info!(video_url, backend_video_id = %backend_video_id, "Video indexed");
        Ok(IndexOutcome {
            backend_video_id,
            message: result.message,
        })
    }
}

/// Turn a non-2xx response into a protocol error
///
/// The body's `error` field is the message when present; otherwise the
/// status line prefixed with `context`.
async fn protocol_error(response: Response, context: &str) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), body = %body, "Backend returned error status");

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("{}: {}", context, status_line(status)));

    GatewayError::Protocol {
        status: status.as_u16(),
        message,
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[async_trait]
impl BackendApi for BackendGateway {
    async fn check_health(&self) -> Result<Value> {
        let backend = self.backend().await?;
        let request = self.http_client.get(backend.endpoint(HEALTH_PATH)?);
        let response = self.send(request, &backend).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Protocol {
                status: status.as_u16(),
                message: format!("Backend health check failed: {}", status.as_u16()),
            });
        }

        Self::read_json(response).await
    }

    async fn index_video(&self, video_url: &str, sink: &dyn ProgressSink) -> Result<IndexOutcome> {
        match self.index_inner(video_url, sink).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::error!(video_url, "Video indexing failed: {}", e);
                sink.emit(RelayEvent::progress(
                    ProgressStep::Error,
                    format!("Processing failed: {}", e),
                ));
                Err(e)
            }
        }
    }

    async fn analyze(&self, params: &AnalyzeParams, sink: &dyn ProgressSink) -> Result<AnalysisOutcome> {
        let backend = self.backend().await?;

        sink.emit(RelayEvent::progress(
            ProgressStep::PreparingAnalysis,
            ProgressStep::PreparingAnalysis.description(),
        ));

        let analysis_type = params.kind.backend_type();
        let mut body = json!({
            "video_id": params.video_id,
            "analysis_type": analysis_type.as_str(),
        });
        if let Some(prompt) = params.effective_prompt() {
            body["prompt"] = json!(prompt);
        }

        sink.emit(RelayEvent::progress(
            ProgressStep::ConnectingToAi,
            ProgressStep::ConnectingToAi.description(),
        ));

        let request = self.http_client.post(backend.endpoint(ANALYZE_PATH)?).json(&body);
        let response = self.send(request, &backend).await?;
        if !response.status().is_success() {
            return Err(protocol_error(response, "Analysis failed").await);
        }

        let mut records = decode_stream(response.bytes_stream(), NdjsonDecoder);
        let mut session: StreamingSession<AnalysisMetadata> = StreamingSession::new();

        while let Some(record) = records.next().await {
            match record? {
                StreamRecord::Metadata(metadata) => {
                    session.set_metadata(metadata);
                    sink.emit(RelayEvent::progress(
                        ProgressStep::StreamingResponse,
                        ProgressStep::StreamingResponse.description(),
                    ));
                }
                StreamRecord::Chunk(chunk) => {
                    let full_text = session.push_chunk(&chunk).to_string();
                    sink.emit(RelayEvent::chunk(chunk, full_text));
                }
                StreamRecord::Done => session.finish(),
                StreamRecord::Status { .. } | StreamRecord::Completed(_) => {}
            }
        }

        let finished = session.is_done();
        let (text, metadata) = session.into_parts();
        let metadata = metadata.unwrap_or_default();
        tracing::info!(
            video_id = %params.video_id,
            analysis_type = analysis_type.as_str(),
            chars = text.len(),
            finished,
            "Analysis stream complete"
        );

        Ok(AnalysisOutcome {
            text,
            backend_video_id: metadata
                .video_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| params.video_id.clone()),
            analysis_type: metadata
                .analysis_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| analysis_type.as_str().to_string()),
        })
    }

    async fn agentic_chat(&self, params: &ChatParams, sink: &dyn ProgressSink) -> Result<ChatOutcome> {
        let backend = self.backend().await?;

        sink.emit(RelayEvent::progress(
            ProgressStep::ProcessingQuery,
            ProgressStep::ProcessingQuery.description(),
        ));

        let request = self.http_client.post(backend.endpoint(CHAT_PATH)?).json(&json!({
            "query": params.query,
            "conversation_context": params.conversation_context,
        }));
        let response = self.send(request, &backend).await?;

        sink.emit(RelayEvent::progress(
            ProgressStep::ProcessingResponse,
            ProgressStep::ProcessingResponse.description(),
        ));

        if !response.status().is_success() {
            return Err(protocol_error(response, "Backend request failed").await);
        }

        let payload: ChatPayload = Self::read_json(response).await?;
        if let Some(error) = payload.error.clone() {
            return Err(GatewayError::Application(error));
        }

        tracing::debug!(intent = ?payload.intent, found = payload.found_video_count(), "Chat answered");
        Ok(ChatOutcome {
            text: render_inline(&payload),
            intent: payload.intent,
            found_videos: payload.found_videos.unwrap_or_default(),
            indexed_videos: payload.indexed_videos.unwrap_or_default(),
            backend_video_id: payload.video_id,
        })
    }

    async fn agentic_chat_stream(&self, params: &ChatParams, sink: &dyn ProgressSink) -> Result<ChatOutcome> {
        let backend = self.backend().await?;

        sink.emit(RelayEvent::progress(
            ProgressStep::ProcessingQuery,
            ProgressStep::ProcessingQuery.description(),
        ));

        let request = self.http_client.post(backend.endpoint(CHAT_STREAM_PATH)?).json(&json!({
            "query": params.query,
            "conversation_context": params.conversation_context,
        }));
        let response = self.send(request, &backend).await?;
        if !response.status().is_success() {
            return Err(protocol_error(response, "Backend request failed").await);
        }

        let mut records = decode_stream(response.bytes_stream(), SseDecoder);
        let mut session: StreamingSession<ChatPayload> = StreamingSession::new();

        while let Some(record) = records.next().await {
            match record? {
                StreamRecord::Status { status, message } => {
                    if let Some(message) = message.filter(|m| !m.is_empty()) {
                        sink.emit(RelayEvent::chat_status(status, message));
                    }
                }
                StreamRecord::Completed(payload) => {
                    let text = strip_intent_prefix(
                        payload.response.as_deref().unwrap_or_default(),
                        payload.found_video_count(),
                    );
                    session.push_chunk(&text);
                    sink.emit(RelayEvent::StreamingChunk {
                        chunk: text.clone(),
                        full_text: text,
                        found_videos: payload.found_videos.clone(),
                    });
                    session.set_metadata(payload);
                    session.finish();
                }
                StreamRecord::Done => session.finish(),
                StreamRecord::Metadata(_) | StreamRecord::Chunk(_) => {}
            }
        }

        let (text, completed) = session.into_parts();
        let Some(payload) = completed else {
            tracing::warn!("Chat stream ended without a completed record");
            return Ok(ChatOutcome::default());
        };

        Ok(ChatOutcome {
            text,
            intent: payload.intent,
            found_videos: payload.found_videos.unwrap_or_default(),
            indexed_videos: payload.indexed_videos.unwrap_or_default(),
            backend_video_id: payload.video_id,
        })
    }
}

/// Builder for [`BackendGateway`]
#[derive(Default)]
pub struct BackendGatewayBuilder {
    storage: Option<Storage>,
    http_client: Option<reqwest::Client>,
    config: GatewayConfig,
}

impl BackendGatewayBuilder {
    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Use a preconfigured client; the timeouts in `config` are then ignored
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<BackendGateway> {
        let storage = self
            .storage
            .ok_or_else(|| GatewayError::Internal("storage is required".to_string()))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => self
                .config
                .http_client()
                .map_err(|e| GatewayError::Internal(format!("failed to create HTTP client: {}", e)))?,
        };

        Ok(BackendGateway {
            http_client,
            mapper: VideoMapper::new(storage.clone()),
            storage,
        })
    }
}
