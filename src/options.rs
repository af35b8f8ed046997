//! Sampling parameters for generation requests.
//!
//! Parameters resolve in three layers: hard defaults, persisted per-instance
//! values, and per-call overrides, with later layers winning.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_TOP_K: u32 = 40;
pub const DEFAULT_REPEAT_PENALTY: f64 = 1.1;
pub const DEFAULT_SEED: i64 = 0;
pub const DEFAULT_NUM_PREDICT: i32 = 128;

/// Fully resolved sampling parameters, serialized as the `options` object of
/// a generate request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationOptions {
    /// Randomness of token selection, 0.0–2.0.
    pub temperature: f64,
    /// Nucleus sampling cutoff, 0.0–1.0.
    pub top_p: f64,
    /// Candidate pool size, 1–100.
    pub top_k: u32,
    /// Penalty applied to repeated tokens, 0.0–2.0.
    pub repeat_penalty: f64,
    /// Sampling seed; 0 lets the service pick one.
    pub seed: i64,
    /// Token cap for the reply; -1 means no cap, otherwise 1–4096.
    pub num_predict: i32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            repeat_penalty: DEFAULT_REPEAT_PENALTY,
            seed: DEFAULT_SEED,
            num_predict: DEFAULT_NUM_PREDICT,
        }
    }
}

impl GenerationOptions {
    /// Apply a set of overrides on top of these options.
    pub fn merged(&self, overrides: &GenerationOverrides) -> Self {
        Self {
            temperature: overrides.temperature.unwrap_or(self.temperature),
            top_p: overrides.top_p.unwrap_or(self.top_p),
            top_k: overrides.top_k.unwrap_or(self.top_k),
            repeat_penalty: overrides.repeat_penalty.unwrap_or(self.repeat_penalty),
            seed: overrides.seed.unwrap_or(self.seed),
            num_predict: overrides.num_predict.unwrap_or(self.num_predict),
        }
    }
}

/// Partial sampling parameters. Unset fields defer to the layer below.
///
/// Doubles as the persisted shape of stored per-instance values and as the
/// per-call override argument of the client entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

impl GenerationOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub const fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub const fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub const fn with_repeat_penalty(mut self, repeat_penalty: f64) -> Self {
        self.repeat_penalty = Some(repeat_penalty);
        self
    }

    pub const fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub const fn with_num_predict(mut self, num_predict: i32) -> Self {
        self.num_predict = Some(num_predict);
        self
    }
}
