use serde::Deserialize;
use serde_json::{Map, Value};

use super::{AnalysisMetadata, IncrementalDecoder, LineError, StreamRecord};

/// One line of the `/api/analyze` body
#[derive(Debug, Default, Deserialize)]
struct AnalyzeLine {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    streaming: bool,
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Newline-delimited JSON framing used by the analysis endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonDecoder;

impl IncrementalDecoder for NdjsonDecoder {
    fn name(&self) -> &'static str {
        "ndjson"
    }

    fn decode_line(&self, line: &str) -> Result<Vec<StreamRecord>, LineError> {
        let parsed: AnalyzeLine =
            serde_json::from_str(line).map_err(|e| LineError::Malformed(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(LineError::Remote(error));
        }

        if parsed.status.as_deref() == Some("success") && parsed.streaming {
            let metadata = serde_json::from_value::<AnalysisMetadata>(Value::Object(parsed.rest))
                .map_err(|e| LineError::Malformed(e.to_string()))?;
            return Ok(vec![StreamRecord::Metadata(metadata)]);
        }

        let mut records = Vec::new();
        if let Some(chunk) = parsed.chunk.filter(|c| !c.is_empty()) {
            records.push(StreamRecord::Chunk(chunk));
        }
        if parsed.done {
            records.push(StreamRecord::Done);
        }
        Ok(records)
    }
}
