//! Wire types for the generation service API.

use serde::Serialize;

use crate::options::GenerationOptions;

/// Body of a `POST /api/generate` call.
///
/// Built fresh per call and never mutated after dispatch. `images` is omitted
/// from the wire form for text-only requests.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub stream: bool,
    pub keep_alive: i64,
    pub options: GenerationOptions,
}

/// One decoded NDJSON line of a streaming generate response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    /// Partial token text; may be empty.
    pub response: String,
    /// True on the final record of a generation.
    pub done: bool,
}

impl StreamRecord {
    /// Parse one line as a stream record.
    ///
    /// Field extraction is lenient: a missing or non-string `response` reads
    /// as empty, and `done` counts only when it is exactly boolean `true`.
    /// Only a line that is not a JSON object at all is an error.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(line)?;
        Ok(Self {
            response: value
                .get("response")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            done: value.get("done").and_then(serde_json::Value::as_bool) == Some(true),
        })
    }
}
