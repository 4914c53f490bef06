use std::sync::Arc;

use vidsage_store::{Storage, StoreError, VideoMapper};
use vidsage_types::{Command, Pong, Reply, Resolved};

use crate::error::{GatewayError, Result};
use crate::gateway::BackendGateway;
use crate::sink::ProgressSink;
use crate::traits::BackendApi;

/// Single entry point for commands coming from the page-side relay
#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn BackendApi>,
    storage: Storage,
    mapper: VideoMapper,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn BackendApi>, storage: Storage) -> Self {
        Self {
            backend,
            mapper: VideoMapper::new(storage.clone()),
            storage,
        }
    }

    pub fn from_gateway(gateway: BackendGateway) -> Self {
        let storage = gateway.storage().clone();
        Self::new(Arc::new(gateway), storage)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Run one command to completion
    ///
    /// Progress goes to `sink` while the command runs; the returned reply is
    /// the single resolved value. `getVideoId` never fails.
    pub async fn dispatch(&self, command: Command, sink: &dyn ProgressSink) -> Result<Reply> {
        let action = command.action();
        tracing::info!(action, "Dispatching command");

        let result = self.run(command, sink).await;
        match &result {
            Err(e) if e.is_local() => tracing::warn!(action, "Command rejected: {}", e),
            Err(e) => tracing::error!(action, status = ?e.status(), "Command failed: {}", e),
            Ok(_) => tracing::debug!(action, "Command resolved"),
        }
        result
    }

    async fn run(&self, command: Command, sink: &dyn ProgressSink) -> Result<Reply> {
        let reply = match command {
            Command::GetBackendUrl => Reply::BackendUrl(self.storage.backend_url().await?.to_string()),
            Command::SaveBackendUrl { backend_url } => {
                self.storage
                    .save_backend_url(&backend_url)
                    .await
                    .map_err(|e| match e {
                        StoreError::InvalidBackendUrl(_) => GatewayError::Validation(e.to_string()),
                        e => e.into(),
                    })?;
                Reply::saved()
            }
            Command::CheckBackendHealth => Reply::Health(self.backend.check_health().await?),
            Command::IndexVideo { video_url } => {
                Reply::Indexed(Resolved::new(self.backend.index_video(&video_url, sink).await?))
            }
            Command::AnalyzeVideo(params) | Command::AnalyzeVideoStream(params) => {
                Reply::Analysis(Resolved::streamed(self.backend.analyze(&params, sink).await?))
            }
            Command::GetVideoId { video_url } => Reply::VideoId(self.mapper.lookup(&video_url).await),
            Command::AgenticChat(params) => {
                Reply::Chat(Resolved::new(self.backend.agentic_chat(&params, sink).await?))
            }
            Command::AgenticChatStream(params) => {
                Reply::Chat(Resolved::streamed(self.backend.agentic_chat_stream(&params, sink).await?))
            }
            Command::GetConfig => Reply::Config(self.storage.settings().await?),
            Command::SaveConfig(patch) => {
                self.storage.save_config(patch).await?;
                Reply::saved()
            }
            Command::Test => Reply::Pong(Pong::now()),
        };

        Ok(reply)
    }
}
