//! Error types for image acquisition and generation calls.

use thiserror::Error;

/// Failure while turning an image reference into raw bytes.
///
/// Every variant carries the reference that failed so batch callers can tell
/// which input broke the request.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The reference points at a local file that does not exist.
    #[error("image not found: {reference}")]
    NotFound { reference: String },

    /// The image source could not be reached, or answered with a non-200 status.
    #[error("image source unreachable ({reference}): {detail}")]
    Unreachable { reference: String, detail: String },

    /// The source answered but its body could not be read.
    #[error("failed to read image data ({reference}): {detail}")]
    Read { reference: String, detail: String },

    /// The fetch succeeded but produced zero bytes.
    #[error("image payload is empty: {reference}")]
    Empty { reference: String },
}

impl AcquisitionError {
    /// The image reference this error is about.
    pub fn reference(&self) -> &str {
        match self {
            Self::NotFound { reference }
            | Self::Unreachable { reference, .. }
            | Self::Read { reference, .. }
            | Self::Empty { reference } => reference,
        }
    }
}

/// Failure of a `/api/generate` call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// One of the input images could not be acquired; the whole call aborts.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// The request never produced a response (connect, send or protocol error).
    #[error("generation request failed: {0}")]
    Request(String),

    /// The service answered with a non-200 status. Carries the body text; the
    /// request is not retried.
    #[error("generation service returned HTTP {status}: {body}")]
    BadResponse { status: u16, body: String },
}
