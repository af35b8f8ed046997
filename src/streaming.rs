//! NDJSON stream aggregation.
//!
//! The generate endpoint streams one JSON object per line. This module folds
//! such a byte stream into the final concatenated text. Decoding is total:
//! malformed lines are skipped with a warning and a mid-stream transport error
//! ends the stream with whatever has accumulated so far.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::warn;

use crate::types::StreamRecord;

/// Fold a newline-delimited JSON byte stream into one result string.
///
/// Fragments are appended strictly in arrival order. Consumption stops at the
/// first record whose `done` field is `true`, otherwise at stream end. Lines
/// that are empty, whitespace-only, or not valid JSON contribute nothing.
pub async fn collect_ndjson<S>(byte_stream: S) -> String
where
    S: Stream<Item = Result<Bytes, std::io::Error>>,
{
    // Route the byte stream through an AsyncRead so the codec handles line
    // buffering and chunk boundaries that split a line.
    let reader = StreamReader::new(Box::pin(byte_stream));
    let mut lines = FramedRead::new(reader, LinesCodec::new());

    let mut collected = String::new();
    while let Some(next) = lines.next().await {
        let line = match next {
            Ok(line) => line,
            Err(error) => {
                warn!(error = %error, "generation stream ended early");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = match StreamRecord::parse(trimmed) {
            Ok(record) => record,
            Err(error) => {
                warn!(error = %error, line = trimmed, "skipping malformed stream line");
                continue;
            }
        };
        collected.push_str(&record.response);
        if record.done {
            break;
        }
    }
    collected
}
