//! Incremental decoding of streamed backend responses
//!
//! The backend speaks two framings: bare NDJSON (`/api/analyze`) and SSE
//! `data: ` lines (`/api/agentic-chat/stream`). Both share the buffering and
//! line splitting in [`decode_stream`]; only line interpretation differs and
//! lives behind [`IncrementalDecoder`].

mod ndjson;
mod sse;

pub use ndjson::NdjsonDecoder;
pub use sse::SseDecoder;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::pin::Pin;

use vidsage_types::{ChatPayload, ChatStatus};

use crate::buffer_utils::CircularLineBuffer;
use crate::error::GatewayError;

/// Classified record decoded from one line
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRecord {
    /// Leading `{status:"success", streaming:true}` record of an analysis stream
    Metadata(AnalysisMetadata),

    /// Incremental answer text
    Chunk(String),

    /// Informational progress line (`info` / `success`)
    Status {
        status: ChatStatus,
        message: Option<String>,
    },

    /// Final chat payload; ends the stream
    Completed(ChatPayload),

    /// Explicit end marker (`{done:true}` or `[DONE]`)
    Done,
}

impl StreamRecord {
    /// Nothing after a terminal record is parsed
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamRecord::Completed(_) | StreamRecord::Done)
    }
}

/// Metadata announced at the start of an analysis stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a single line produced no records
#[derive(Debug, Clone, PartialEq)]
pub enum LineError {
    /// Unparseable line; logged and skipped
    Malformed(String),

    /// The backend reported a failure in-band; ends the stream
    Remote(String),
}

/// Line interpretation strategy for one wire framing
pub trait IncrementalDecoder: Send + 'static {
    /// Framing name used in logs
    fn name(&self) -> &'static str;

    /// Decode one complete, trimmed, non-empty line
    fn decode_line(&self, line: &str) -> Result<Vec<StreamRecord>, LineError>;
}

pub type RecordStream = Pin<Box<dyn Stream<Item = Result<StreamRecord, GatewayError>> + Send>>;

/// Turn a chunked response body into a stream of classified records
///
/// Records come out in wire order. Malformed lines are skipped, a terminal
/// record or an in-band error ends the stream, and a line left unterminated
/// when the body ends is still decoded.
pub fn decode_stream<S, B, E, D>(body: S, decoder: D) -> RecordStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    D: IncrementalDecoder,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(body);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut records_seen = 0usize;

        'body: loop {
            let ended = match byte_chunks.next().await {
                Some(Ok(bytes)) => {
                    buffer.extend(bytes.as_ref());
                    false
                }
                Some(Err(e)) => {
                    yield Err(GatewayError::Stream(e.to_string()));
                    break 'body;
                }
                None => {
                    buffer.close();
                    true
                }
            };

            // Process all complete lines in buffer
            while let Some(line_result) = buffer.next_line() {
                let line = match line_result {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!(decoder = decoder.name(), "Skipping line: {}", e);
                        continue;
                    }
                };

                if line.is_empty() {
                    continue;
                }

                match decoder.decode_line(&line) {
                    Ok(records) => {
                        for record in records {
                            records_seen += 1;
                            let terminal = record.is_terminal();
                            yield Ok(record);
                            if terminal {
                                tracing::debug!(decoder = decoder.name(), records_seen, "Stream finished");
                                break 'body;
                            }
                        }
                    }
                    Err(LineError::Malformed(reason)) => {
                        tracing::warn!(decoder = decoder.name(), line = %line, "Failed to parse line: {}", reason);
                    }
                    Err(LineError::Remote(message)) => {
                        yield Err(GatewayError::Application(message));
                        break 'body;
                    }
                }
            }

            if ended {
                tracing::debug!(decoder = decoder.name(), records_seen, "Body ended without end marker");
                break 'body;
            }
        }
    })
}
