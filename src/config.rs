//! Client configuration.
//!
//! Two shapes: the runtime [`ClientConfig`] a client is built from, and the
//! persisted [`StoredConfig`] read back from wherever the host keeps
//! configuration. The stored shape carries the legacy split host/port fields
//! and per-instance sampling overrides; `resolve()` normalizes both into the
//! runtime shape.

use std::path::PathBuf;

use serde::Deserialize;

use crate::endpoint::{Endpoint, fold_legacy_host_port};
use crate::options::{GenerationOptions, GenerationOverrides};

pub const DEFAULT_VISION_MODEL: &str = "moondream";
pub const DEFAULT_TEXT_MODEL: &str = "llama3.1";
pub const DEFAULT_KEEP_ALIVE: i64 = -1;

/// Endpoint, model and parameters for one side of a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub endpoint: Endpoint,
    pub model: String,
    /// Seconds the service keeps the model loaded after a request; -1 means
    /// indefinitely, 0 unloads immediately.
    pub keep_alive: i64,
    pub options: GenerationOptions,
}

impl ModelConfig {
    pub fn new(address: &str, model: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::resolve(address, None),
            model: model.into(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: i64) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Full configuration of one logical client instance.
///
/// The text side is wholly absent when no text endpoint is configured; the
/// elaboration path then degrades to a pass-through.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub vision: ModelConfig,
    pub text: Option<ModelConfig>,
    /// Base URL of the host's own API, for internal image references.
    pub internal_api: Option<String>,
    /// Root directory local image references are resolved under.
    pub media_root: PathBuf,
}

impl ClientConfig {
    pub fn new(vision: ModelConfig) -> Self {
        Self {
            vision,
            text: None,
            internal_api: None,
            media_root: PathBuf::from("."),
        }
    }

    pub fn with_text(mut self, text: ModelConfig) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_internal_api(mut self, base_url: impl Into<String>) -> Self {
        self.internal_api = Some(base_url.into());
        self
    }

    pub fn with_media_root(mut self, media_root: impl Into<PathBuf>) -> Self {
        self.media_root = media_root.into();
        self
    }
}

/// Persisted form of one model side.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredModelConfig {
    /// Combined address: bare hostname, `host:port`, or full URL.
    pub host: String,
    /// Legacy split port field; folded into `host` by [`normalize`](Self::normalize).
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub keep_alive: Option<i64>,
    #[serde(default)]
    pub options: GenerationOverrides,
}

impl StoredModelConfig {
    /// Fold the legacy split host/port representation into the combined
    /// address. Applied once wherever persisted configuration is read.
    pub fn normalize(&mut self) {
        let folded = fold_legacy_host_port(&self.host, self.port);
        if folded != self.host {
            self.host = folded;
            self.port = None;
        }
    }

    /// Resolve into a runtime [`ModelConfig`], merging stored overrides over
    /// the hard defaults.
    pub fn resolve(mut self, default_model: &str) -> ModelConfig {
        self.normalize();
        ModelConfig {
            endpoint: Endpoint::resolve(&self.host, self.port),
            model: self.model.unwrap_or_else(|| default_model.to_string()),
            keep_alive: self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE),
            options: GenerationOptions::default().merged(&self.options),
        }
    }
}

/// Persisted form of a full client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredConfig {
    pub vision: StoredModelConfig,
    /// Gate for the text side. When false the text side is dropped entirely,
    /// even if its fields were persisted.
    #[serde(default)]
    pub text_model_enabled: bool,
    #[serde(default)]
    pub text: Option<StoredModelConfig>,
    #[serde(default)]
    pub internal_api: Option<String>,
    #[serde(default)]
    pub media_root: Option<PathBuf>,
}

impl StoredConfig {
    pub fn resolve(self) -> ClientConfig {
        let text = if self.text_model_enabled {
            self.text.map(|stored| stored.resolve(DEFAULT_TEXT_MODEL))
        } else {
            None
        };
        ClientConfig {
            vision: self.vision.resolve(DEFAULT_VISION_MODEL),
            text,
            internal_api: self.internal_api,
            media_root: self.media_root.unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
