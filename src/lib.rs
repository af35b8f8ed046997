//! Streaming client for an Ollama-style generation service, oriented around
//! image description.
//!
//! The crate does four things:
//!
//! - resolves loosely specified service addresses (bare hostname, `host:port`,
//!   full URL) into canonical endpoints ([`endpoint`]),
//! - turns image references (internal API paths, external URLs, local files)
//!   into raw bytes ([`image`]),
//! - folds the service's newline-delimited JSON response stream into one
//!   result string ([`streaming`]),
//! - and orchestrates the two generate calls: a vision pass that describes
//!   images, and an optional text pass that elaborates the description
//!   ([`client`]).
//!
//! ```rust,no_run
//! use ollama_vision::{ClientConfig, GenerationOverrides, ModelConfig, OllamaVisionClient};
//!
//! # async fn run() -> Result<(), ollama_vision::GenerationError> {
//! let config = ClientConfig::new(ModelConfig::new("192.168.1.5:11434", "moondream"))
//!     .with_text(ModelConfig::new("192.168.1.5", "llama3.1"))
//!     .with_media_root("/media");
//! let client = OllamaVisionClient::new(config);
//!
//! let description = client
//!     .describe(
//!         &["snapshots/front_door.jpg".to_string()],
//!         "Describe the person at the door.",
//!         &GenerationOverrides::new(),
//!     )
//!     .await?;
//! let message = client
//!     .elaborate(&description, "Introduce this guest: {description}", &Default::default())
//!     .await;
//! # let _ = message;
//! # Ok(())
//! # }
//! ```
//!
//! Elaboration is best-effort: without a configured text side, or when the
//! text pass fails, the description itself comes back unchanged.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod image;
pub mod options;
pub mod registry;
pub mod streaming;
pub mod types;

pub use client::{DESCRIPTION_PLACEHOLDER, OllamaVisionClient};
pub use config::{
    ClientConfig, DEFAULT_KEEP_ALIVE, DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL, ModelConfig,
    StoredConfig, StoredModelConfig,
};
pub use endpoint::{DEFAULT_PORT, Endpoint, Scheme, fold_legacy_host_port};
pub use error::{AcquisitionError, GenerationError};
pub use image::{ImageFetcher, ImageSource, InternalApi};
pub use options::{GenerationOptions, GenerationOverrides};
pub use registry::{ClientRegistry, FirstByInsertion, SelectionStrategy};
pub use streaming::collect_ndjson;
pub use types::{GenerateRequest, StreamRecord};
