//! Generation client.
//!
//! Orchestrates one logical request per call: acquire image bytes, build the
//! wire request, POST it to the generate endpoint and fold the streamed reply
//! into the final text. A client holds no mutable state; concurrent calls are
//! independent and uncoordinated.

use base64::{Engine, engine::general_purpose::STANDARD};
use futures_util::TryStreamExt;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::GenerationError;
use crate::image::{ImageFetcher, InternalApi};
use crate::options::GenerationOverrides;
use crate::streaming::collect_ndjson;
use crate::types::GenerateRequest;

/// Placeholder the elaboration template substitutes the description into.
pub const DESCRIPTION_PLACEHOLDER: &str = "{description}";

/// Client for one configured pair of vision and (optional) text endpoints.
pub struct OllamaVisionClient {
    config: ClientConfig,
    fetcher: ImageFetcher,
    http: reqwest::Client,
}

impl OllamaVisionClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Build a client around an existing HTTP client, shared with the image
    /// fetcher and the internal API surface.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        let mut fetcher =
            ImageFetcher::new(config.media_root.clone()).with_http_client(http.clone());
        if let Some(base_url) = &config.internal_api {
            fetcher = fetcher.with_internal_api(InternalApi::new(base_url.clone(), http.clone()));
        }
        Self {
            config,
            fetcher,
            http,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Describe one or more images.
    ///
    /// Fetches every reference (aborting the whole call on the first
    /// acquisition failure), base64-encodes the payloads and runs one
    /// streaming generate call against the vision endpoint. Per-call
    /// `overrides` win over the configured sampling parameters.
    pub async fn describe(
        &self,
        references: &[String],
        prompt: &str,
        overrides: &GenerationOverrides,
    ) -> Result<String, GenerationError> {
        match self.describe_inner(references, prompt, overrides).await {
            Ok(text) => Ok(text),
            Err(source) => {
                error!(
                    references = ?references,
                    endpoint = %self.config.vision.endpoint.base_url(),
                    error = %source,
                    "image description failed"
                );
                Err(source)
            }
        }
    }

    async fn describe_inner(
        &self,
        references: &[String],
        prompt: &str,
        overrides: &GenerationOverrides,
    ) -> Result<String, GenerationError> {
        let payloads = self.fetcher.fetch_all(references).await?;
        let images = payloads
            .iter()
            .map(|data| STANDARD.encode(data))
            .collect::<Vec<_>>();

        let side = &self.config.vision;
        debug!(model = %side.model, endpoint = %side.endpoint.base_url(), prompt, "vision request");
        let request = GenerateRequest {
            model: side.model.clone(),
            prompt: prompt.to_string(),
            images,
            stream: true,
            keep_alive: side.keep_alive,
            options: side.options.merged(overrides),
        };
        self.generate(&side.endpoint, &request).await
    }

    /// Elaborate a description through the text model.
    ///
    /// Substitutes `source_text` for every `{description}` in the template and
    /// runs a text-only generate call. Elaboration is best-effort: with no
    /// text side configured, on any upstream failure, or on an empty result,
    /// the unmodified `source_text` comes back instead of an error.
    pub async fn elaborate(
        &self,
        source_text: &str,
        prompt_template: &str,
        overrides: &GenerationOverrides,
    ) -> String {
        let Some(side) = &self.config.text else {
            return source_text.to_string();
        };

        let prompt = prompt_template.replace(DESCRIPTION_PLACEHOLDER, source_text);
        debug!(model = %side.model, endpoint = %side.endpoint.base_url(), prompt, "text request");
        let request = GenerateRequest {
            model: side.model.clone(),
            prompt,
            images: Vec::new(),
            stream: true,
            keep_alive: side.keep_alive,
            options: side.options.merged(overrides),
        };
        match self.generate(&side.endpoint, &request).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!(model = %side.model, "text model produced no output, keeping the description");
                source_text.to_string()
            }
            Err(error) => {
                warn!(
                    endpoint = %side.endpoint.base_url(),
                    error = %error,
                    "text elaboration failed, keeping the description"
                );
                source_text.to_string()
            }
        }
    }

    /// One streaming generate call: single attempt, response body folded by
    /// the NDJSON decoder.
    async fn generate(
        &self,
        endpoint: &Endpoint,
        request: &GenerateRequest,
    ) -> Result<String, GenerationError> {
        let url = endpoint.api_url("generate");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|error| GenerationError::Request(error.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::BadResponse {
                status: status.as_u16(),
                body,
            });
        }

        let byte_stream = response
            .bytes_stream()
            .map_err(|error| std::io::Error::other(format!("stream error: {error}")));
        Ok(collect_ndjson(byte_stream).await)
    }
}

impl std::fmt::Debug for OllamaVisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaVisionClient")
            .field("vision_endpoint", &self.config.vision.endpoint.base_url())
            .field("vision_model", &self.config.vision.model)
            .field(
                "text_endpoint",
                &self
                    .config
                    .text
                    .as_ref()
                    .map(|side| side.endpoint.base_url()),
            )
            .field("text_model", &self.config.text.as_ref().map(|side| &side.model))
            .finish()
    }
}
