//! Backend gateway of the vidsage background service
//!
//! Talks to the remote AI backend (index, analyze, chat), decodes its two
//! streaming wire formats and turns page-side [`Command`](vidsage_types::Command)s
//! into replies through the [`Dispatcher`].

pub mod buffer_utils;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod gateway;
pub mod session;
pub mod sink;
pub mod traits;
pub mod validate;

pub use buffer_utils::CircularLineBuffer;
pub use config::GatewayConfig;
pub use decoder::{
    decode_stream, AnalysisMetadata, IncrementalDecoder, LineError, NdjsonDecoder, RecordStream,
    SseDecoder, StreamRecord,
};
pub use dispatch::Dispatcher;
pub use error::{GatewayError, Result};
pub use format::{render_inline, strip_intent_prefix};
pub use gateway::{BackendGateway, BackendGatewayBuilder};
pub use session::StreamingSession;
pub use sink::{NoopSink, ProgressSink, RecordingSink};
pub use traits::BackendApi;
pub use validate::{is_video_url, validate_video_url};
