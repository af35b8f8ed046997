//! Image acquisition.
//!
//! An image reference names one of three sources: a path on the host's own
//! internal API, an external URL, or a file under a sandboxed media root.
//! Each reference is classified by prefix and fetched with source-specific
//! error handling.

use std::path::PathBuf;

use tracing::debug;

use crate::error::AcquisitionError;

/// Where an image reference points, decided by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// A path served by the host's internal API, e.g. `/api/camera_proxy/x`.
    Internal,
    /// A full `http://` or `https://` URL.
    External,
    /// A filesystem path relative to the media root.
    Local,
}

impl ImageSource {
    pub fn classify(reference: &str) -> Self {
        if reference.starts_with("/api") {
            Self::Internal
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::External
        } else {
            Self::Local
        }
    }
}

/// The host's own HTTP surface, used for internal-API references.
#[derive(Debug, Clone)]
pub struct InternalApi {
    base_url: String,
    client: reqwest::Client,
}

impl InternalApi {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

/// Resolves image references to raw bytes.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    internal: Option<InternalApi>,
    http: reqwest::Client,
    media_root: PathBuf,
}

impl ImageFetcher {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            internal: None,
            http: reqwest::Client::new(),
            media_root: media_root.into(),
        }
    }

    /// Use the given client for external URL fetches.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Enable internal-API references against the given host surface.
    pub fn with_internal_api(mut self, internal: InternalApi) -> Self {
        self.internal = Some(internal);
        self
    }

    /// Fetch one image reference.
    pub async fn fetch(&self, reference: &str) -> Result<Vec<u8>, AcquisitionError> {
        let source = ImageSource::classify(reference);
        debug!(reference, source = ?source, "fetching image");
        let data = match source {
            ImageSource::Internal => self.fetch_internal(reference).await?,
            ImageSource::External => self.fetch_external(reference).await?,
            ImageSource::Local => self.fetch_local(reference).await?,
        };
        if data.is_empty() {
            return Err(AcquisitionError::Empty {
                reference: reference.to_string(),
            });
        }
        Ok(data)
    }

    /// Fetch a batch of references, preserving input order.
    ///
    /// Aborts on the first failure with no partial result; the error names
    /// the failing reference.
    pub async fn fetch_all(&self, references: &[String]) -> Result<Vec<Vec<u8>>, AcquisitionError> {
        let mut payloads = Vec::with_capacity(references.len());
        for reference in references {
            payloads.push(self.fetch(reference).await?);
        }
        Ok(payloads)
    }

    async fn fetch_internal(&self, reference: &str) -> Result<Vec<u8>, AcquisitionError> {
        let Some(internal) = &self.internal else {
            return Err(AcquisitionError::Unreachable {
                reference: reference.to_string(),
                detail: "no internal API configured".to_string(),
            });
        };
        let url = format!("{}{}", internal.base_url.trim_end_matches('/'), reference);
        read_http_image(&internal.client, &url, reference).await
    }

    async fn fetch_external(&self, reference: &str) -> Result<Vec<u8>, AcquisitionError> {
        read_http_image(&self.http, reference, reference).await
    }

    async fn fetch_local(&self, reference: &str) -> Result<Vec<u8>, AcquisitionError> {
        let path = self.media_root.join(reference);
        // tokio::fs runs the stat and read on the blocking pool, off the
        // caller's scheduling context.
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(AcquisitionError::NotFound {
                reference: reference.to_string(),
            });
        }
        tokio::fs::read(&path)
            .await
            .map_err(|error| AcquisitionError::Read {
                reference: reference.to_string(),
                detail: error.to_string(),
            })
    }
}

async fn read_http_image(
    client: &reqwest::Client,
    url: &str,
    reference: &str,
) -> Result<Vec<u8>, AcquisitionError> {
    let response =
        client
            .get(url)
            .send()
            .await
            .map_err(|error| AcquisitionError::Unreachable {
                reference: reference.to_string(),
                detail: error.to_string(),
            })?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(AcquisitionError::Unreachable {
            reference: reference.to_string(),
            detail: format!("HTTP {status}"),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|error| AcquisitionError::Read {
            reference: reference.to_string(),
            detail: error.to_string(),
        })?;
    Ok(body.to_vec())
}
