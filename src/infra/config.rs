// src/infra/config.rs — Configuration loading (TOML + env + remote overlay)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::MirrorsError;
use crate::infra::paths;
use crate::infra::remote::RemoteValues;
use crate::review::ReviewSchema;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Env vars consulted for the API key, in order.
const API_KEY_ENV: [&str; 2] = ["MIRRORS_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub snaps: SnapsConfig,

    /// Optional key-value config service (`[remote]` section).
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    /// Image detail hint sent with the photo ("low", "high", "auto").
    pub detail: String,
    pub jpeg_quality: u8,
    pub timeout_seconds: u64,
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: 300,
            detail: "high".into(),
            jpeg_quality: 80,
            timeout_seconds: 60,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// When non-empty, reviews must carry exactly these attributes.
    #[serde(default)]
    pub expected_attributes: Vec<String>,
    /// Prompt template file; overrides ~/.mirrors/prompt.md and the built-in template.
    #[serde(default)]
    pub prompt_file: Option<String>,
    /// Prompt text delivered by the remote config service, if any.
    #[serde(skip)]
    pub remote_prompt: Option<String>,
}

impl ReviewConfig {
    pub fn schema(&self) -> ReviewSchema {
        if self.expected_attributes.is_empty() {
            ReviewSchema::Open
        } else {
            ReviewSchema::Fixed(self.expected_attributes.clone())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapsConfig {
    pub initial_count: u32,
}

impl Default for SnapsConfig {
    fn default() -> Self {
        Self { initial_count: 14 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default = "default_remote_timeout")]
    pub timeout_seconds: u64,
}

fn default_remote_timeout() -> u64 {
    10
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay values fetched from the remote config service.
    pub fn apply_remote(&mut self, values: RemoteValues) {
        if let Some(prompt) = values.outfit_prompt_text.filter(|p| !p.trim().is_empty()) {
            self.review.remote_prompt = Some(prompt);
        }
        if let Some(count) = values.initial_snaps_count {
            self.snaps.initial_count = count;
        }
        if self.provider.api_key.is_none() {
            self.provider.api_key = values.oaikey.filter(|k| !k.is_empty());
        }
    }

    /// Resolve the API key: config file, then environment.
    pub fn api_key(&self) -> Result<String, MirrorsError> {
        if let Some(key) = self.provider.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        API_KEY_ENV
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| {
                MirrorsError::Config(
                    "No API key configured. Set MIRRORS_API_KEY or [provider].api_key.".into(),
                )
            })
    }
}
