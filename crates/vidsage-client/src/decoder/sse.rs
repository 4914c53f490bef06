use vidsage_types::{ChatPayload, ChatStatus};

use super::{IncrementalDecoder, LineError, StreamRecord};

/// `data: ` framed JSON used by the streaming agentic chat endpoint
///
/// Lines without the `data: ` prefix (comments, `event:` fields) are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SseDecoder;

impl SseDecoder {
    fn is_done_marker(data: &str) -> bool {
        data == "[DONE]"
    }
}

impl IncrementalDecoder for SseDecoder {
    fn name(&self) -> &'static str {
        "sse"
    }

    fn decode_line(&self, line: &str) -> Result<Vec<StreamRecord>, LineError> {
        let Some(data) = line.strip_prefix("data: ") else {
            return Ok(Vec::new());
        };
        let data = data.trim();

        if Self::is_done_marker(data) {
            return Ok(vec![StreamRecord::Done]);
        }

        let payload: ChatPayload =
            serde_json::from_str(data).map_err(|e| LineError::Malformed(e.to_string()))?;

        match payload.status {
            Some(ChatStatus::Info) | Some(ChatStatus::Success) => Ok(vec![StreamRecord::Status {
                status: payload.status.unwrap_or(ChatStatus::Info),
                message: payload.message,
            }]),
            Some(ChatStatus::Completed) => Ok(vec![StreamRecord::Completed(payload)]),
            Some(ChatStatus::Error) => Err(LineError::Remote(
                payload
                    .message
                    .or(payload.error)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )),
            Some(ChatStatus::Unknown) | None => {
                tracing::debug!(data = %truncate(data), "Ignoring SSE record without known status");
                Ok(Vec::new())
            }
        }
    }
}

fn truncate(data: &str) -> &str {
    match data.char_indices().nth(120) {
        Some((idx, _)) => &data[..idx],
        None => data,
    }
}
